//! Opaque continuation cursors

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Continuation token handed out by a datastore after a fetch.
///
/// Only the datastore that produced a cursor can interpret it; everyone
/// else passes it around as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode a backend-specific position as an opaque token
    pub fn encode<T: Serialize>(position: &T) -> ModelResult<Self> {
        Ok(Self(hex::encode(serde_json::to_vec(position)?)))
    }

    /// Decode a token produced by [`Cursor::encode`]
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> ModelResult<T> {
        let bytes = hex::decode(&self.0).map_err(|_| ModelError::InvalidCursor(self.0.clone()))?;
        serde_json::from_slice(&bytes).map_err(|_| ModelError::InvalidCursor(self.0.clone()))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}
