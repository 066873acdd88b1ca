//! Model types - runtime description of a datastore kind

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use super::entity::Entity;
use super::key::{qualified_path, EntityKey};
use super::property::PropertyDescriptor;
use super::value::Value;
use crate::error::{ModelError, ModelResult};

/// A datastore kind together with its property schema
#[derive(Debug, Clone, PartialEq)]
pub struct ModelType {
    name: String,
    namespace: String,
    properties: Vec<PropertyDescriptor>,
}

impl ModelType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property declaration. A later declaration with the same name
    /// replaces the earlier one.
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.retain(|p| p.name != property.name);
        self.properties.push(property);
        self
    }

    /// Finish the declaration
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `namespace.name`, the identity of the type
    pub fn qualified_path(&self) -> String {
        qualified_path(&self.namespace, &self.name)
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Two handles describe the same type when their qualified paths match
    pub fn is_same_type(&self, other: &ModelType) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }

    /// Key of the entity of this type with the given surrogate id
    pub fn key_for(&self, id: i64) -> EntityKey {
        EntityKey::new(self.namespace.clone(), self.name.clone(), id)
    }

    /// Whether `key` addresses an entity of this type
    pub fn owns_key(&self, key: &EntityKey) -> bool {
        key.namespace() == self.namespace && key.kind() == self.name
    }

    /// Construct an unsaved entity from property values.
    ///
    /// Missing properties take their default (or the current time for
    /// auto timestamps). Unknown property names are rejected.
    pub fn instantiate(self: &Arc<Self>, mut values: BTreeMap<String, Value>) -> ModelResult<Entity> {
        if let Some(unknown) = values.keys().find(|name| self.property(name).is_none()) {
            return Err(ModelError::Validation(format!(
                "{} has no property named {}",
                self.name, unknown
            )));
        }

        let now = Utc::now().naive_utc();
        for property in &self.properties {
            if !values.contains_key(&property.name) {
                values.insert(property.name.clone(), property.initial_value(now));
            }
        }

        self.validate(&values)?;
        Ok(Entity::from_parts(self.clone(), None, values))
    }

    /// Validate a complete set of property values
    pub fn validate(&self, values: &BTreeMap<String, Value>) -> ModelResult<()> {
        for property in &self.properties {
            let value = values.get(&property.name).unwrap_or(&Value::Null);
            property.validate(value)?;
        }
        Ok(())
    }
}
