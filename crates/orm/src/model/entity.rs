//! Entities - instances of a model type

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::key::EntityKey;
use super::model_type::ModelType;
use super::value::Value;
use crate::error::{ModelError, ModelResult};

static NULL: Value = Value::Null;

/// A model instance, saved or not
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    model: Arc<ModelType>,
    key: Option<EntityKey>,
    values: BTreeMap<String, Value>,
}

impl Entity {
    /// Assemble an entity without validation; used by datastore backends
    /// rehydrating stored data.
    pub fn from_parts(model: Arc<ModelType>, key: Option<EntityKey>, values: BTreeMap<String, Value>) -> Self {
        Self { model, key, values }
    }

    pub fn model(&self) -> &Arc<ModelType> {
        &self.model
    }

    /// Persistent identity, `None` until the entity is first put
    pub fn key(&self) -> Option<&EntityKey> {
        self.key.as_ref()
    }

    /// Surrogate numeric id, `None` until the entity is first put
    pub fn id(&self) -> Option<i64> {
        self.key.as_ref().map(EntityKey::id)
    }

    pub fn is_saved(&self) -> bool {
        self.key.is_some()
    }

    pub fn set_key(&mut self, key: EntityKey) {
        self.key = Some(key);
    }

    /// Value of a property; `Null` for unset or undeclared names
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Assign a declared property, validating the value
    pub fn set(&mut self, name: &str, value: Value) -> ModelResult<()> {
        let property = self.model.property(name).ok_or_else(|| {
            ModelError::Validation(format!("{} has no property named {}", self.model.name(), name))
        })?;
        property.validate(&value)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Refresh `auto_now` properties; called by datastores on put
    pub fn touch(&mut self, now: NaiveDateTime) {
        let model = self.model.clone();
        for property in model.properties().iter().filter(|p| p.auto_now) {
            if let Some(value) = property.timestamp_value(now) {
                self.values.insert(property.name.clone(), value);
            }
        }
    }
}
