//! # jsonrest-core
//!
//! The conversion and search engine behind the jsonrest HTTP surface:
//!
//! - [`converter`]: per-property-type JSON conversion
//! - [`model_converter`]: entity ⇄ JSON object and schema metadata
//! - [`registry`]: the table of exposed model types
//! - [`search`]: query-string → datastore query → page of results
//! - [`errors`]: the API error taxonomy
//! - [`config`]: configuration contract shared with the HTTP crate

pub mod config;
pub mod converter;
pub mod errors;
pub mod model_converter;
pub mod registry;
pub mod search;

pub use config::{AppConfigTrait, ConfigError, ConfigSource, Environment};
pub use converter::{ConversionError, Converter, ConverterRegistry, Direction, ModelResolver, NoModels};
pub use errors::{ApiError, ApiResult, ErrorEnvelope};
pub use model_converter::{ConversionContext, DictionaryConverter, JsonMap, ModelConverter};
pub use registry::{Binding, ModelRegistry, Namespace, RegisteredModel};
pub use search::{PageResult, QueryPlan, SearchLimits};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
