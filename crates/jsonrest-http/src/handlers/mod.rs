//! Request handlers for the REST surface
//!
//! - `metadata`: registered model names and schema descriptors
//! - `models`: create, read, update and delete of single objects
//! - `search`: cursor-paged search

pub mod metadata;
pub mod models;
pub mod search;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use jsonrest_core::{ApiError, JsonMap};
use serde_json::Value as JsonValue;

use crate::errors::HttpError;
use crate::state::ApiState;

/// Query-string parameters in request order, repeats preserved
pub type QueryParams = Vec<(String, String)>;

/// Request body parsed as a JSON object.
///
/// The `Content-Type` header is not inspected. Bodies that are not a JSON
/// object are rejected with `InvalidBodyError`.
pub struct JsonObject(pub JsonMap);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Body limit rejections keep their 413 status
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let invalid = |message: String| HttpError::from(ApiError::invalid_body(message)).into_response();
        match serde_json::from_slice::<JsonValue>(&bytes) {
            Ok(JsonValue::Object(values)) => Ok(JsonObject(values)),
            Ok(other) => Err(invalid(format!(
                "request body must be a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(invalid(format!("request body is not valid JSON: {}", e))),
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Absolute URL of the API root, e.g. `http://localhost:8080/rest`.
///
/// Uses the configured base URL, else the request's `Host` header and
/// forwarded protocol.
pub fn api_root(state: &ApiState, headers: &HeaderMap) -> String {
    let base = match state.config.trimmed_base_url() {
        Some(base) => base.to_string(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("localhost");
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .map(|proto| proto.trim().to_lowercase())
                .filter(|proto| proto == "https" || proto == "http")
                .unwrap_or_else(|| "http".to_string());
            format!("{}://{}", scheme, host)
        }
    };
    format!("{}/{}", base, state.config.prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use jsonrest_core::ModelRegistry;
    use jsonrest_orm::MemoryDatastore;

    fn state(base_url: Option<&str>) -> ApiState {
        let config = HttpConfig {
            base_url: base_url.map(str::to_string),
            ..HttpConfig::default()
        };
        ApiState::new(ModelRegistry::new(), MemoryDatastore::new_shared(), config)
    }

    #[test]
    fn test_api_root_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "localhost:8080".parse().unwrap());
        assert_eq!(api_root(&state(None), &headers), "http://localhost:8080/rest");

        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(api_root(&state(None), &headers), "https://localhost:8080/rest");
    }

    #[test]
    fn test_api_root_prefers_configured_base_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "internal:8080".parse().unwrap());
        assert_eq!(
            api_root(&state(Some("https://fruit.example.com/")), &headers),
            "https://fruit.example.com/rest"
        );
    }
}
