mod models;

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use jsonrest_core::{AppConfigTrait, ModelRegistry};
use jsonrest_http::{
    build_router, init_logging, log_shutdown_info, log_startup_info, start_server, ApiState, BasicAuthenticator,
    HttpConfig, LoggingConfig,
};
use jsonrest_orm::MemoryDatastore;
use tower_http::cors::CorsLayer;
use tracing::info;

const SERVICE_NAME: &str = "jsonrest-demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HttpConfig::from_env().context("Invalid HTTP configuration")?;

    init_logging(LoggingConfig::for_http(&config).with_service(SERVICE_NAME, env!("CARGO_PKG_VERSION")))?;
    log_startup_info(SERVICE_NAME, env!("CARGO_PKG_VERSION"));

    for (field, source) in config.config_sources() {
        tracing::debug!(field = %field, source = %source, "Configuration source");
    }

    let mut registry = ModelRegistry::new();
    registry
        .register_from_namespace(&models::produce(), false, &[], false)
        .context("Failed to register demo models")?;

    let mut state = ApiState::new(registry, MemoryDatastore::new_shared(), config.clone());

    // JSONREST_BASIC_USER / JSONREST_BASIC_PASSWORD turn on Basic auth
    if let (Ok(user), Ok(password)) = (env::var("JSONREST_BASIC_USER"), env::var("JSONREST_BASIC_PASSWORD")) {
        let realm = env::var("JSONREST_BASIC_REALM").unwrap_or_else(|_| SERVICE_NAME.to_string());
        info!(realm = %realm, user = %user, "Basic authentication enabled");
        state = state.with_authenticator(BasicAuthenticator::new(realm).with_user(user, password));
    }

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
    info!(
        "REST API at http://{}/{}/metadata?links=1",
        config.bind_address(),
        config.prefix
    );

    let router = build_router(state).layer(CorsLayer::permissive());
    start_server(addr, router).await?;

    log_shutdown_info(SERVICE_NAME);
    Ok(())
}
