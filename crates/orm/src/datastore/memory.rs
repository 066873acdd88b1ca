//! In-memory datastore implementation.
//!
//! Entities are grouped per model type in ordered maps keyed by surrogate
//! id. Cursors record the sort value and id of the last row returned, so a
//! resumed fetch continues strictly after it: pages never overlap and never
//! skip rows unless data changes between fetches.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Datastore, QueryResults};
use crate::error::{ModelError, ModelResult};
use crate::model::{Entity, EntityKey, ModelType, Value};
use crate::query::{Cursor, Order, OrderDirection, Query};

static NULL: Value = Value::Null;

/// Position of the last row of a page
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CursorPosition {
    order_value: Option<Value>,
    id: i64,
}

impl CursorPosition {
    fn of(order: Option<&Order>, entity: &Entity) -> Self {
        Self {
            order_value: order.map(|o| entity.get(&o.property).clone()),
            id: entity.id().unwrap_or_default(),
        }
    }
}

/// In-memory implementation of [`Datastore`]
#[derive(Debug)]
pub struct MemoryDatastore {
    /// Entities keyed by model type path, then by id
    entities: DashMap<String, BTreeMap<i64, Entity>>,
    next_id: AtomicI64,
}

impl Default for MemoryDatastore {
    fn default() -> Self {
        Self {
            entities: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryDatastore {
    /// Creates a new in-memory datastore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory datastore wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored entities of a model type
    pub fn count(&self, model: &ModelType) -> usize {
        self.entities
            .get(&model.qualified_path())
            .map(|entities| entities.len())
            .unwrap_or(0)
    }
}

fn compare_rows(order: Option<&Order>, a_value: &Value, a_id: i64, b_value: &Value, b_id: i64) -> Ordering {
    let primary = match order {
        Some(order) => {
            let ordering = a_value.sort_cmp(b_value);
            match order.direction {
                OrderDirection::Asc => ordering,
                OrderDirection::Desc => ordering.reverse(),
            }
        }
        None => Ordering::Equal,
    };
    primary.then(a_id.cmp(&b_id))
}

fn order_value<'a>(order: Option<&Order>, entity: &'a Entity) -> &'a Value {
    match order {
        Some(order) => entity.get(&order.property),
        None => &NULL,
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn get_by_id(&self, model: &ModelType, id: i64) -> ModelResult<Option<Entity>> {
        Ok(self
            .entities
            .get(&model.qualified_path())
            .and_then(|entities| entities.get(&id).cloned()))
    }

    async fn get_by_key(&self, model: &ModelType, key: &str) -> ModelResult<Entity> {
        let key = EntityKey::decode(key)?;
        if !model.owns_key(&key) {
            return Err(ModelError::InvalidKey(format!(
                "key of a {} does not address a {}",
                key.kind_path(),
                model.qualified_path()
            )));
        }

        self.get_by_id(model, key.id())
            .await?
            .ok_or_else(|| ModelError::NotFound(format!("{} with id {}", model.qualified_path(), key.id())))
    }

    async fn put(&self, entity: &mut Entity) -> ModelResult<EntityKey> {
        let model = entity.model().clone();
        let key = match entity.key() {
            Some(key) => key.clone(),
            None => model.key_for(self.next_id.fetch_add(1, AtomicOrdering::SeqCst)),
        };

        if !model.owns_key(&key) {
            return Err(ModelError::InvalidKey(format!(
                "cannot store a {} under a key of a {}",
                model.qualified_path(),
                key.kind_path()
            )));
        }

        entity.touch(Utc::now().naive_utc());
        model.validate(entity.values())?;
        entity.set_key(key.clone());

        self.entities
            .entry(model.qualified_path())
            .or_default()
            .insert(key.id(), entity.clone());

        debug!(kind = %key.kind_path(), id = key.id(), "Stored entity");
        Ok(key)
    }

    async fn delete(&self, key: &EntityKey) -> ModelResult<()> {
        let removed = self
            .entities
            .get_mut(&key.kind_path())
            .and_then(|mut entities| entities.remove(&key.id()));

        match removed {
            Some(_) => {
                debug!(kind = %key.kind_path(), id = key.id(), "Deleted entity");
                Ok(())
            }
            None => Err(ModelError::NotFound(format!("{} with id {}", key.kind_path(), key.id()))),
        }
    }

    async fn fetch(&self, query: &Query) -> ModelResult<QueryResults> {
        let order = query.ordering();
        let position = query
            .cursor()
            .map(|cursor| cursor.decode::<CursorPosition>())
            .transpose()?;

        let mut rows: Vec<Entity> = match self.entities.get(&query.model().qualified_path()) {
            Some(entities) => entities
                .values()
                .filter(|entity| query.filters().iter().all(|filter| filter.matches(entity)))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        rows.sort_by(|a, b| {
            compare_rows(
                order,
                order_value(order, a),
                a.id().unwrap_or_default(),
                order_value(order, b),
                b.id().unwrap_or_default(),
            )
        });

        if let Some(position) = &position {
            let resume_value = position.order_value.clone().unwrap_or(Value::Null);
            rows.retain(|row| {
                compare_rows(
                    order,
                    order_value(order, row),
                    row.id().unwrap_or_default(),
                    &resume_value,
                    position.id,
                ) == Ordering::Greater
            });
        }

        if let Some(limit) = query.limit_count() {
            rows.truncate(limit);
        }

        let cursor = match rows.last() {
            Some(last) => Some(Cursor::encode(&CursorPosition::of(order, last))?),
            None => query.cursor().cloned(),
        };

        debug!(
            kind = %query.model().qualified_path(),
            filters = query.filters().len(),
            rows = rows.len(),
            "Fetched entities"
        );

        Ok(QueryResults { rows, cursor })
    }
}
