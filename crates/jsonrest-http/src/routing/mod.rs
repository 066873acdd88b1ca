//! Route table for the REST surface
//!
//! All routes are nested under `/{prefix}` and pass through the
//! authentication guard. Body limit, timeout and tracing layers wrap the
//! whole router, and error statuses the router or its layers produce are
//! rendered in the failure envelope.

use axum::middleware::{from_fn_with_state, map_response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::guard;
use crate::errors::responses::envelope_rejections;
use crate::handlers::{metadata, models, search};
use crate::state::ApiState;

/// Routes relative to the prefix, without layers
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/metadata", get(metadata::list_models))
        .route("/metadata/:model", get(metadata::describe_model))
        .route("/:model", post(models::create))
        .route("/:model/search", get(search::search))
        .route(
            "/:model/:key",
            get(models::read).put(models::update).delete(models::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), guard))
        .with_state(state)
}

/// The complete application router
pub fn build_router(state: ApiState) -> Router {
    let config = state.config.clone();
    debug!(
        mount = %config.mount_path(),
        models = state.registry.len(),
        "Building router"
    );

    let router = Router::new()
        .nest(&config.mount_path(), api_routes(state))
        .layer(RequestBodyLimitLayer::new(config.max_request_size))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(map_response(envelope_rejections));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
