//! HTTP server error types
//!
//! API failures raised while handling a request travel as
//! [`HttpError::Api`]. [`HttpError::Rejected`] carries error statuses the
//! router produces on its own; the remaining variants cover server setup.

use axum::http::StatusCode;
use jsonrest_core::{ApiError, ConfigError};
use thiserror::Error;

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// HTTP server errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Unmatched route, method mismatch, timeout or body limit
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Server startup failed: {message}")]
    StartupFailed { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl HttpError {
    pub fn startup<T: Into<String>>(message: T) -> Self {
        HttpError::StartupFailed {
            message: message.into(),
        }
    }

    pub fn rejected(status: StatusCode) -> Self {
        HttpError::Rejected {
            status,
            message: status.canonical_reason().unwrap_or("Request failed").to_string(),
        }
    }

    /// Envelope `type` name
    pub fn type_name(&self) -> &'static str {
        match self {
            HttpError::Api(error) => error.type_name(),
            HttpError::Rejected { status, .. } => match *status {
                StatusCode::NOT_FOUND => "NotFoundError",
                StatusCode::METHOD_NOT_ALLOWED => "MethodNotAllowedError",
                StatusCode::REQUEST_TIMEOUT => "RequestTimeoutError",
                StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLargeError",
                _ => "RequestError",
            },
            HttpError::StartupFailed { .. } | HttpError::Config(_) => "ApiFailureError",
        }
    }
}

impl From<jsonrest_orm::ModelError> for HttpError {
    fn from(error: jsonrest_orm::ModelError) -> Self {
        HttpError::Api(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_keep_their_message() {
        let error: HttpError = ApiError::object_missing("Fruit", "key", "abc").into();
        assert_eq!(error.to_string(), "Fruit with key abc not found");
        assert_eq!(error.type_name(), "ObjectMissingError");
    }

    #[test]
    fn test_model_errors_route_through_api_error() {
        let error: HttpError = jsonrest_orm::ModelError::Validation("name is required".into()).into();
        assert_eq!(error.type_name(), "ValidationError");

        let error: HttpError = jsonrest_orm::ModelError::Database("disk full".into()).into();
        assert_eq!(error.type_name(), "DatastoreError");
    }

    #[test]
    fn test_rejections_name_their_status() {
        let error = HttpError::rejected(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(error.to_string(), "Method Not Allowed");
        assert_eq!(error.type_name(), "MethodNotAllowedError");

        assert_eq!(HttpError::rejected(StatusCode::REQUEST_TIMEOUT).type_name(), "RequestTimeoutError");
        assert_eq!(HttpError::rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE).type_name(), "RequestError");
    }

    #[test]
    fn test_startup_errors() {
        let error = HttpError::startup("address in use");
        assert_eq!(error.to_string(), "Server startup failed: address in use");
        assert_eq!(error.type_name(), "ApiFailureError");
    }
}
