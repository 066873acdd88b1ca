use jsonrest_orm::ModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures surfaced by the REST API.
///
/// Every variant has a stable envelope `type` name (see
/// [`ApiError::type_name`]) and an HTTP status (see
/// [`ApiError::status_code`]).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{model} with {lookup} {value} not found")]
    ObjectMissing {
        model: String,
        /// `id` or `key`, whichever was tried last
        lookup: String,
        value: String,
    },

    #[error("Model \"{name}\" not registered")]
    ModelNotRegistered { name: String },

    #[error("Model with name {name} already registered as {existing}")]
    NameCollision { name: String, existing: String },

    #[error("authentication required")]
    AuthenticationRequired { challenge: String },

    #[error("authentication failed")]
    Forbidden,

    #[error("https is required")]
    HttpsRequired,

    #[error("{message}")]
    ApiFailure { message: String },

    #[error("Cannot convert property {property}: {message}")]
    TypeConversion { property: String, message: String },

    #[error("Property {property} holds a value its converter cannot handle: {message}")]
    UnhandledProperty { property: String, message: String },

    #[error("{message}")]
    InvalidParameter { parameter: String, message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("{0}")]
    Datastore(ModelError),
}

impl ApiError {
    pub fn object_missing(model: impl Into<String>, lookup: impl Into<String>, value: impl ToString) -> Self {
        Self::ObjectMissing {
            model: model.into(),
            lookup: lookup.into(),
            value: value.to_string(),
        }
    }

    pub fn model_not_registered(name: impl Into<String>) -> Self {
        Self::ModelNotRegistered { name: name.into() }
    }

    pub fn name_collision(name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::NameCollision {
            name: name.into(),
            existing: existing.into(),
        }
    }

    pub fn authentication_required(challenge: impl Into<String>) -> Self {
        Self::AuthenticationRequired {
            challenge: challenge.into(),
        }
    }

    pub fn api_failure(message: impl Into<String>) -> Self {
        Self::ApiFailure {
            message: message.into(),
        }
    }

    pub fn type_conversion(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeConversion {
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn unhandled_property(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnhandledProperty {
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::InvalidBody {
            message: message.into(),
        }
    }

    /// Envelope `type` name
    pub fn type_name(&self) -> &'static str {
        match self {
            ApiError::ObjectMissing { .. } => "ObjectMissingError",
            ApiError::ModelNotRegistered { .. } => "ModelNotRegisteredError",
            ApiError::NameCollision { .. } => "NameCollisionError",
            ApiError::AuthenticationRequired { .. } => "AuthenticationRequiredError",
            ApiError::Forbidden => "ForbiddenError",
            ApiError::HttpsRequired => "HttpsRequiredError",
            ApiError::ApiFailure { .. } => "ApiFailureError",
            ApiError::TypeConversion { .. } => "TypeConversionError",
            ApiError::UnhandledProperty { .. } => "UnhandledPropertyError",
            ApiError::InvalidParameter { .. } => "InvalidParameterError",
            ApiError::Validation { .. } => "ValidationError",
            ApiError::InvalidBody { .. } => "InvalidBodyError",
            ApiError::Datastore(_) => "DatastoreError",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ObjectMissing { .. } => 404,
            ApiError::AuthenticationRequired { .. } => 401,
            ApiError::Forbidden => 403,
            ApiError::TypeConversion { .. }
            | ApiError::InvalidParameter { .. }
            | ApiError::Validation { .. }
            | ApiError::InvalidBody { .. } => 400,
            ApiError::ModelNotRegistered { .. }
            | ApiError::NameCollision { .. }
            | ApiError::HttpsRequired
            | ApiError::ApiFailure { .. }
            | ApiError::UnhandledProperty { .. }
            | ApiError::Datastore(_) => 500,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Challenge to send in `WWW-Authenticate`, if any
    pub fn challenge(&self) -> Option<&str> {
        match self {
            ApiError::AuthenticationRequired { challenge } => Some(challenge),
            _ => None,
        }
    }

    /// Render the failure envelope body
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            status: "error".to_string(),
            message: self.to_string(),
            error_type: self.type_name().to_string(),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::Validation(message) => ApiError::Validation { message },
            ModelError::InvalidCursor(cursor) => {
                ApiError::invalid_parameter("cursor", format!("invalid cursor '{}'", cursor))
            }
            other => ApiError::Datastore(other),
        }
    }
}

/// Failure envelope: `{"status":"error","message":...,"type":...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: String,
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}
