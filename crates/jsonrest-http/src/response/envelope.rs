//! JSON envelope responses
//!
//! Every API response body is an envelope: `{"status":"success","data":...}`
//! on success, `{"status":"error","message":...,"type":...}` on failure.

use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Response builder for enveloped JSON bodies
#[derive(Debug)]
pub struct JsonEnvelope {
    status: StatusCode,
    headers: HeaderMap,
    body: JsonValue,
    pretty: bool,
}

impl JsonEnvelope {
    /// Response with a fully formed envelope body
    pub fn new(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
            pretty: false,
        }
    }

    /// `200 OK` success envelope around `data`
    pub fn success(data: JsonValue) -> Self {
        Self::new(StatusCode::OK, json!({ "status": "success", "data": data }))
    }

    /// Success envelope around any serializable payload
    pub fn success_of<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::success(serde_json::to_value(data)?))
    }

    /// Set response status code
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Indent the body
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Add a header; values that are not valid header text are dropped
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => warn!(header = %name, "Dropping invalid header value"),
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &JsonValue {
        &self.body
    }
}

impl IntoResponse for JsonEnvelope {
    fn into_response(self) -> Response {
        let bytes = match render_json(&self.body, self.pretty) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to render JSON envelope: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut response = (self.status, bytes).into_response();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        response.headers_mut().extend(self.headers);
        response
    }
}

/// Serialize `body`, indented by four spaces when `pretty` is set
pub fn render_json(body: &JsonValue, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    if !pretty {
        return serde_json::to_vec(body);
    }

    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    body.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Whether the query string asks for indented output (`pretty=1`)
pub fn wants_pretty(params: &[(String, String)]) -> bool {
    params
        .iter()
        .any(|(name, value)| name == "pretty" && is_truthy(value))
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
