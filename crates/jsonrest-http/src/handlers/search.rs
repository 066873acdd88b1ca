//! `GET /{model}/search`

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use jsonrest_core::{search, ApiError, QueryPlan};

use super::{api_root, QueryParams};
use crate::errors::HttpResult;
use crate::response::{wants_pretty, JsonEnvelope};
use crate::state::ApiState;

/// One page of results: `{models, cursor, next_page_url}`
pub async fn search(
    State(state): State<ApiState>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> HttpResult<JsonEnvelope> {
    let ctx = state.conversion_context();
    let registered = state.registry.resolve_by_name(&model)?;

    let plan = QueryPlan::parse(&ctx, &registered.model_type, &params, state.config.search_limits())?;
    let page_url = format!("{}/{}/search", api_root(&state, &headers), model);
    let page = search::execute(&ctx, state.store.as_ref(), registered, &plan, &page_url).await?;

    let envelope = JsonEnvelope::success_of(&page).map_err(|e| ApiError::api_failure(e.to_string()))?;
    Ok(envelope.pretty(wants_pretty(&params)))
}
