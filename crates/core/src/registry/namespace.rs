//! Namespaces - explicit trees of named bindings scanned for model types

use std::sync::Arc;

use jsonrest_orm::ModelType;

/// What a name in a namespace is bound to
#[derive(Debug, Clone)]
pub enum Binding {
    Model(Arc<ModelType>),
    Namespace(Arc<Namespace>),
    /// Anything else; skipped by discovery
    Other,
}

/// A dotted-path namespace and the names bound in it.
///
/// Sub-namespace bindings may point anywhere, including outside this
/// namespace's own subtree (an import); discovery only descends into
/// paths below the namespace it is scanning.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    path: String,
    bindings: Vec<(String, Binding)>,
}

impl Namespace {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bindings: Vec::new(),
        }
    }

    /// Bind a model type under its own name
    pub fn with_model(mut self, model: Arc<ModelType>) -> Self {
        self.bindings.push((model.name().to_string(), Binding::Model(model)));
        self
    }

    /// Bind a namespace under the last segment of its path
    pub fn with_namespace(mut self, namespace: Arc<Namespace>) -> Self {
        let name = namespace.path.rsplit('.').next().unwrap_or_default().to_string();
        self.bindings.push((name, Binding::Namespace(namespace)));
        self
    }

    pub fn with_binding(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.bindings.push((name.into(), binding));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bindings(&self) -> &[(String, Binding)] {
        &self.bindings
    }

    /// Whether `other` lies strictly below this namespace
    pub fn contains(&self, other: &Namespace) -> bool {
        other
            .path
            .strip_prefix(self.path.as_str())
            .is_some_and(|rest| rest.starts_with('.') && rest.len() > 1)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_only_descendants() {
        let app = Namespace::new("app");
        assert!(app.contains(&Namespace::new("app.models")));
        assert!(app.contains(&Namespace::new("app.models.fruit")));
        assert!(!app.contains(&Namespace::new("application")));
        assert!(!app.contains(&Namespace::new("app")));
        assert!(!app.contains(&Namespace::new("lib.app")));
    }

    #[test]
    fn test_with_namespace_binds_last_segment() {
        let models = Namespace::new("app.models").shared();
        let app = Namespace::new("app").with_namespace(models);
        assert_eq!(app.bindings()[0].0, "models");
    }
}
