//! # jsonrest-http
//!
//! The REST surface for jsonrest, built on axum:
//! - CRUD, search and metadata routes under a configurable prefix
//! - Uniform success/error JSON envelopes
//! - Pluggable authentication and an HTTPS policy check
//! - Environment-driven configuration, logging bootstrap and graceful
//!   shutdown

// Core modules
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod response;
pub mod routing;
pub mod server;
pub mod state;

pub use auth::{AuthOutcome, Authenticator, BasicAuthenticator, RequestHead};
pub use config::{HttpConfig, HttpDefaults};
pub use errors::{HttpError, HttpResult};
pub use logging::{init_logging, log_shutdown_info, log_startup_info, LoggingConfig};
pub use response::JsonEnvelope;
pub use routing::build_router;
pub use server::{serve_listener, shutdown_signal, start_server};
pub use state::ApiState;
