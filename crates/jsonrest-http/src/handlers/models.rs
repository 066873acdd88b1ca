//! Single-object handlers: `POST /{model}` and
//! `GET`/`PUT`/`DELETE /{model}/{id_or_key}`

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use serde_json::{json, Value as JsonValue};
use tracing::info;

use super::{api_root, JsonObject, QueryParams};
use crate::errors::HttpResult;
use crate::response::{wants_pretty, JsonEnvelope};
use crate::state::ApiState;

/// Create an object; answers 201 with the created object and its
/// `Location`
pub async fn create(
    State(state): State<ApiState>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
    JsonObject(values): JsonObject,
) -> HttpResult<JsonEnvelope> {
    let ctx = state.conversion_context();
    let registered = state.registry.resolve_by_name(&model)?;

    let entity = registered
        .converter
        .create(&ctx, state.store.as_ref(), &registered.model_type, &values)
        .await?;
    let data = registered.converter.read(&ctx, &entity)?;

    let location = format!(
        "{}/{}/{}",
        api_root(&state, &headers),
        model,
        entity.id().unwrap_or_default()
    );
    info!(model = %model, id = entity.id().unwrap_or_default(), "Created object");

    Ok(JsonEnvelope::success(JsonValue::Object(data))
        .status(StatusCode::CREATED)
        .with_header(header::LOCATION, &location)
        .pretty(wants_pretty(&params)))
}

/// Read one object by id or key
pub async fn read(
    State(state): State<ApiState>,
    Path((model, key)): Path<(String, String)>,
    Query(params): Query<QueryParams>,
) -> HttpResult<JsonEnvelope> {
    let ctx = state.conversion_context();
    let (entity, registered) = state.registry.resolve_instance(state.store.as_ref(), &model, &key).await?;
    let data = registered.converter.read(&ctx, &entity)?;

    Ok(JsonEnvelope::success(JsonValue::Object(data)).pretty(wants_pretty(&params)))
}

/// Assign the given properties; answers with the updated object
pub async fn update(
    State(state): State<ApiState>,
    Path((model, key)): Path<(String, String)>,
    Query(params): Query<QueryParams>,
    JsonObject(values): JsonObject,
) -> HttpResult<JsonEnvelope> {
    let ctx = state.conversion_context();
    let (entity, registered) = state.registry.resolve_instance(state.store.as_ref(), &model, &key).await?;

    let entity = registered
        .converter
        .update(&ctx, state.store.as_ref(), entity, &values)
        .await?;
    let data = registered.converter.read(&ctx, &entity)?;

    Ok(JsonEnvelope::success(JsonValue::Object(data)).pretty(wants_pretty(&params)))
}

/// Delete one object; answers with the id or key it was addressed by
pub async fn delete(
    State(state): State<ApiState>,
    Path((model, key)): Path<(String, String)>,
    Query(params): Query<QueryParams>,
) -> HttpResult<JsonEnvelope> {
    let (entity, _) = state.registry.resolve_instance(state.store.as_ref(), &model, &key).await?;

    if let Some(entity_key) = entity.key() {
        state.store.delete(entity_key).await?;
    }
    info!(model = %model, key = %key, "Deleted object");

    Ok(JsonEnvelope::success(addressed_by(&key)).pretty(wants_pretty(&params)))
}

/// The path segment an object was addressed by: an integer when numeric
fn addressed_by(key: &str) -> JsonValue {
    match key.parse::<i64>() {
        Ok(id) => json!(id),
        Err(_) => json!(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addressed_by() {
        assert_eq!(addressed_by("42"), json!(42));
        assert_eq!(addressed_by("agVmcnVpdA"), json!("agVmcnVpdA"));
    }
}
