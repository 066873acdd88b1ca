//! Configuration foundation shared by the jsonrest crates
//!
//! - `app_config`: the [`AppConfigTrait`] contract and runtime [`Environment`]
//! - `sources`: where each loaded value came from
//! - `validation`: [`ConfigError`] and reusable validators

pub mod app_config;
pub mod sources;
pub mod validation;

pub use app_config::*;
pub use sources::*;
pub use validation::*;
