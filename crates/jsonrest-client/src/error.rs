//! Client error types

use thiserror::Error;

/// Result type for client calls
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API root: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Object missing: {0}")]
    ObjectMissing(String),

    #[error("{0}")]
    OperatorNotFound(String),

    #[error("API call failed ({status}): {message}")]
    ApiCallFailed {
        status: u16,
        error_type: Option<String>,
        message: String,
    },
}

impl ClientError {
    pub fn is_object_missing(&self) -> bool {
        matches!(self, ClientError::ObjectMissing(_))
    }

    /// Envelope `type` of a failed call, when the server sent one
    pub fn error_type(&self) -> Option<&str> {
        match self {
            ClientError::ApiCallFailed { error_type, .. } => error_type.as_deref(),
            ClientError::ObjectMissing(_) => Some("ObjectMissingError"),
            ClientError::Forbidden => Some("ForbiddenError"),
            ClientError::AuthenticationRequired => Some("AuthenticationRequiredError"),
            _ => None,
        }
    }
}
