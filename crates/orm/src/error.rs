//! Error types for the datastore layer
//!
//! Covers model validation, key decoding, persistence lookups and query
//! execution failures raised by `Datastore` implementations.

use std::fmt;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for datastore operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Backend failure while reading or writing entities
    Database(String),
    /// Entity not found in the datastore
    NotFound(String),
    /// Entity values violate the model schema
    Validation(String),
    /// Opaque key string could not be decoded or belongs to another kind
    InvalidKey(String),
    /// Serialization/deserialization error (cursors, keys)
    Serialization(String),
    /// Query could not be executed as described
    Query(String),
    /// Continuation cursor was not produced by this datastore
    InvalidCursor(String),
    /// Model type or property declaration error
    Configuration(String),
}

impl ModelError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::Database(_) => "database",
            ModelError::NotFound(_) => "not_found",
            ModelError::Validation(_) => "validation",
            ModelError::InvalidKey(_) => "invalid_key",
            ModelError::Serialization(_) => "serialization",
            ModelError::Query(_) => "query",
            ModelError::InvalidCursor(_) => "invalid_cursor",
            ModelError::Configuration(_) => "configuration",
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::NotFound(what) => write!(f, "Entity not found: {}", what),
            ModelError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ModelError::InvalidKey(msg) => write!(f, "Invalid key error: {}", msg),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Query(msg) => write!(f, "Query error: {}", msg),
            ModelError::InvalidCursor(cursor) => write!(f, "Invalid cursor '{}'", cursor),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

// Convert from hex decoding errors
impl From<hex::FromHexError> for ModelError {
    fn from(err: hex::FromHexError) -> Self {
        ModelError::InvalidKey(err.to_string())
    }
}
