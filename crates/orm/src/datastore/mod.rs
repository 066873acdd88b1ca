//! Datastore capability - the narrow interface the REST layer consumes
//!
//! Backends implement [`Datastore`]; [`MemoryDatastore`] is the bundled
//! in-process implementation.

pub mod memory;

use async_trait::async_trait;

use crate::error::ModelResult;
use crate::model::{Entity, EntityKey, ModelType};
use crate::query::{Cursor, Query};

pub use memory::MemoryDatastore;

/// Rows returned by one fetch plus the position to resume from
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    pub rows: Vec<Entity>,
    /// Continuation cursor positioned after the last row, when the backend
    /// can produce one
    pub cursor: Option<Cursor>,
}

/// Abstract persistence interface for model entities.
///
/// Implementations must be thread-safe (Send + Sync). Single-entity writes
/// are atomic; fetches are read-only.
#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    /// Look up an entity by surrogate numeric id; `Ok(None)` when absent
    async fn get_by_id(&self, model: &ModelType, id: i64) -> ModelResult<Option<Entity>>;

    /// Look up an entity by its opaque key string. Fails for malformed
    /// keys, keys of another model type, and missing entities.
    async fn get_by_key(&self, model: &ModelType, key: &str) -> ModelResult<Entity>;

    /// Insert or replace an entity, assigning an id on first put
    async fn put(&self, entity: &mut Entity) -> ModelResult<EntityKey>;

    /// Remove an entity
    async fn delete(&self, key: &EntityKey) -> ModelResult<()>;

    /// Run a query: filters combined conjunctively, optional ordering,
    /// resuming after the cursor, at most `limit` rows
    async fn fetch(&self, query: &Query) -> ModelResult<QueryResults>;
}
