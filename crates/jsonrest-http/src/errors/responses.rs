//! HTTP error response formatting

use super::HttpError;
use crate::response::JsonEnvelope;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, error};

impl HttpError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::Api(error) => {
                StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            HttpError::Rejected { status, .. } => *status,
            HttpError::StartupFailed { .. } | HttpError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn challenge(&self) -> Option<&str> {
        match self {
            HttpError::Api(error) => error.challenge(),
            _ => None,
        }
    }
}

// Failure envelopes are always indented
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error_type = self.type_name(), "{}", self);
        } else {
            debug!(status = status.as_u16(), error_type = self.type_name(), "{}", self);
        }

        let body = json!({
            "status": "error",
            "message": self.to_string(),
            "type": self.type_name(),
        });

        let mut envelope = JsonEnvelope::new(status, body).pretty(true);
        if let Some(challenge) = self.challenge() {
            envelope = envelope.with_header(header::WWW_AUTHENTICATE, challenge);
        }
        envelope.into_response()
    }
}

/// Re-render error responses that bypassed the handlers in the failure
/// envelope. JSON responses and successes pass through untouched.
pub async fn envelope_rejections(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped = HttpError::rejected(status).into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrest_core::ApiError;
    use tracing_test::traced_test;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HttpError::from(ApiError::object_missing("Fruit", "id", 1)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from(ApiError::invalid_body("expected an object")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HttpError::from(ApiError::Forbidden).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            HttpError::from(ApiError::HttpsRequired).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_challenge_becomes_header() {
        let response = HttpError::from(ApiError::authentication_required("Basic realm=\"fruit\"")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"fruit\""
        );
    }

    #[test]
    #[traced_test]
    fn test_server_errors_are_logged() {
        let response = HttpError::from(ApiError::model_not_registered("Vegetable")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs_contain("Vegetable"));
        assert!(logs_contain("ModelNotRegisteredError"));
    }

    #[tokio::test]
    async fn test_bare_rejections_get_envelope() {
        let response = envelope_rejections(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );

        let ok = envelope_rejections(StatusCode::NO_CONTENT.into_response()).await;
        assert!(ok.headers().get(header::CONTENT_TYPE).is_none());

        let forbidden = HttpError::from(ApiError::Forbidden).into_response();
        let passed = envelope_rejections(forbidden).await;
        assert_eq!(passed.status(), StatusCode::FORBIDDEN);
    }
}
