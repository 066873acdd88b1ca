//! `GET /metadata` and `GET /metadata/{model}`

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde_json::{json, Value as JsonValue};

use super::{api_root, QueryParams};
use crate::errors::HttpResult;
use crate::response::{wants_pretty, JsonEnvelope};
use crate::state::ApiState;

/// Registered model names; with `links=1`, each name with its metadata and
/// search URLs
pub async fn list_models(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> HttpResult<JsonEnvelope> {
    let names = state.registry.names();
    let with_links = params.iter().any(|(name, value)| name == "links" && !value.is_empty() && value != "0");

    let data = if with_links {
        let root = api_root(&state, &headers);
        JsonValue::Array(
            names
                .iter()
                .map(|name| {
                    json!({
                        "name": name,
                        "metadata_url": format!("{}/metadata/{}", root, name),
                        "search_url": format!("{}/{}/search", root, name),
                    })
                })
                .collect(),
        )
    } else {
        json!(names)
    };

    Ok(JsonEnvelope::success(data).pretty(wants_pretty(&params)))
}

/// Schema descriptor of one model
pub async fn describe_model(
    State(state): State<ApiState>,
    Path(model): Path<String>,
    Query(params): Query<QueryParams>,
) -> HttpResult<JsonEnvelope> {
    let registered = state.registry.resolve_by_name(&model)?;
    let metadata = registered.converter.metadata(&registered.model_type);

    Ok(JsonEnvelope::success(JsonValue::Object(metadata)).pretty(wants_pretty(&params)))
}
