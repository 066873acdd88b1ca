//! Model registry - the table of model types exposed by the API
//!
//! Built during startup by explicit registration or by scanning a
//! [`Namespace`] tree, then shared read-only. Each entry pairs a model type
//! with the [`ModelConverter`] used for its requests.

pub mod namespace;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use jsonrest_orm::{Datastore, Entity, ModelType};
use tracing::{debug, info};

use crate::converter::ModelResolver;
use crate::errors::{ApiError, ApiResult};
use crate::model_converter::{DictionaryConverter, ModelConverter};

pub use namespace::{Binding, Namespace};

/// A model type registered under a public name
#[derive(Clone)]
pub struct RegisteredModel {
    pub name: String,
    pub model_type: Arc<ModelType>,
    pub converter: Arc<dyn ModelConverter>,
}

impl fmt::Debug for RegisteredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModel")
            .field("name", &self.name)
            .field("model_type", &self.model_type.qualified_path())
            .finish()
    }
}

/// Name → model table
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `model_type` under its name, or `namespace.name` when
    /// `qualify` is set. Without a converter the [`DictionaryConverter`]
    /// is used.
    ///
    /// Registering the same type under the same name again is a no-op;
    /// a different type under a taken name is a `NameCollision`.
    pub fn register(
        &mut self,
        model_type: Arc<ModelType>,
        converter: Option<Arc<dyn ModelConverter>>,
        qualify: bool,
    ) -> ApiResult<String> {
        let name = if qualify {
            model_type.qualified_path()
        } else {
            model_type.name().to_string()
        };

        if let Some(existing) = self.models.get(&name) {
            if existing.model_type.is_same_type(&model_type) {
                debug!(name = %name, "Model already registered");
                return Ok(name);
            }
            return Err(ApiError::name_collision(name, existing.model_type.qualified_path()));
        }

        info!(name = %name, model = %model_type.qualified_path(), "Registered model");
        self.models.insert(
            name.clone(),
            RegisteredModel {
                name: name.clone(),
                model_type,
                converter: converter.unwrap_or_else(DictionaryConverter::shared),
            },
        );
        Ok(name)
    }

    /// Register every model type bound in `namespace`.
    ///
    /// Model types whose qualified path appears in `exclude` are skipped.
    /// With `recurse`, sub-namespaces lying below the scanned namespace are
    /// scanned too; each namespace path is visited at most once. Returns
    /// the names registered, in discovery order.
    pub fn register_from_namespace(
        &mut self,
        namespace: &Namespace,
        qualify: bool,
        exclude: &[String],
        recurse: bool,
    ) -> ApiResult<Vec<String>> {
        info!(namespace = %namespace.path(), recurse, "Adding models from namespace");

        let mut visited = HashSet::new();
        let mut registered = Vec::new();
        self.scan(namespace, qualify, exclude, recurse, &mut visited, &mut registered)?;
        Ok(registered)
    }

    fn scan(
        &mut self,
        namespace: &Namespace,
        qualify: bool,
        exclude: &[String],
        recurse: bool,
        visited: &mut HashSet<String>,
        registered: &mut Vec<String>,
    ) -> ApiResult<()> {
        if !visited.insert(namespace.path().to_string()) {
            return Ok(());
        }

        for (binding_name, binding) in namespace.bindings() {
            match binding {
                Binding::Model(model_type) => {
                    if exclude.contains(&model_type.qualified_path()) {
                        debug!(model = %model_type.qualified_path(), "Excluded from registration");
                        continue;
                    }
                    let name = self.register(model_type.clone(), None, qualify)?;
                    if !registered.contains(&name) {
                        registered.push(name);
                    }
                }
                Binding::Namespace(child) if recurse && namespace.contains(child) => {
                    self.scan(child, qualify, exclude, recurse, visited, registered)?;
                }
                Binding::Namespace(child) => {
                    debug!(binding = %binding_name, namespace = %child.path(), "Not descending into namespace");
                }
                Binding::Other => {}
            }
        }
        Ok(())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn resolve_by_name(&self, name: &str) -> ApiResult<&RegisteredModel> {
        self.models
            .get(name)
            .ok_or_else(|| ApiError::model_not_registered(name))
    }

    /// Name a model type was registered under
    pub fn registered_name(&self, model_type: &ModelType) -> Option<&str> {
        self.models
            .values()
            .find(|registered| registered.model_type.is_same_type(model_type))
            .map(|registered| registered.name.as_str())
    }

    /// Load the entity addressed by `key`, which is either a surrogate
    /// numeric id or an opaque key string.
    ///
    /// Numeric input is tried as an id first and then as a key. When
    /// nothing is found the error names the model and the attempted value.
    pub async fn resolve_instance(
        &self,
        store: &dyn Datastore,
        name: &str,
        key: &str,
    ) -> ApiResult<(Entity, &RegisteredModel)> {
        let registered = self.resolve_by_name(name)?;
        let model = &registered.model_type;

        let numeric_id = key.parse::<i64>().ok();
        if let Some(id) = numeric_id {
            match store.get_by_id(model, id).await {
                Ok(Some(entity)) => return Ok((entity, registered)),
                Ok(None) => debug!(model = %name, id, "No entity with id, trying as key"),
                Err(e) => debug!(model = %name, id, error = %e, "Lookup by id failed, trying as key"),
            }
        }

        match store.get_by_key(model, key).await {
            Ok(entity) => Ok((entity, registered)),
            Err(e) => {
                debug!(model = %name, key = %key, error = %e, "Lookup by key failed");
                let lookup = if numeric_id.is_some() { "id" } else { "key" };
                Err(ApiError::object_missing(name, lookup, key))
            }
        }
    }
}

impl ModelResolver for ModelRegistry {
    fn resolve_model(&self, namespace: &str, name: &str) -> Option<Arc<ModelType>> {
        self.models
            .values()
            .find(|registered| registered.model_type.namespace() == namespace && registered.model_type.name() == name)
            .map(|registered| registered.model_type.clone())
    }
}
