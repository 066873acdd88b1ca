//! Entity keys - persistent identity of a stored entity
//!
//! A key names the model type (namespace + kind) and the surrogate numeric id
//! assigned by the datastore. Its string form is opaque to clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

const SEPARATOR: char = '\u{1f}';

/// Persistent identity of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    namespace: String,
    kind: String,
    id: i64,
}

impl EntityKey {
    pub fn new(namespace: impl Into<String>, kind: impl Into<String>, id: i64) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            id,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Surrogate numeric id
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Qualified path of the model type this key belongs to
    pub fn kind_path(&self) -> String {
        qualified_path(&self.namespace, &self.kind)
    }

    /// Opaque, URL-safe string form
    pub fn encode(&self) -> String {
        hex::encode(format!(
            "{}{sep}{}{sep}{}",
            self.namespace,
            self.kind,
            self.id,
            sep = SEPARATOR
        ))
    }

    /// Parse the opaque string form produced by [`EntityKey::encode`]
    pub fn decode(encoded: &str) -> ModelResult<Self> {
        let bytes = hex::decode(encoded)?;
        let raw = String::from_utf8(bytes)
            .map_err(|_| ModelError::InvalidKey(format!("key '{}' is not valid UTF-8", encoded)))?;

        let mut parts = raw.split(SEPARATOR);
        let (Some(namespace), Some(kind), Some(id), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ModelError::InvalidKey(format!("malformed key '{}'", encoded)));
        };

        if kind.is_empty() {
            return Err(ModelError::InvalidKey(format!("key '{}' has no kind", encoded)));
        }

        let id = id
            .parse::<i64>()
            .map_err(|_| ModelError::InvalidKey(format!("key '{}' has a non-numeric id", encoded)))?;

        Ok(Self::new(namespace, kind, id))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for EntityKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Join a namespace and a type name into a dotted path
pub fn qualified_path(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}
