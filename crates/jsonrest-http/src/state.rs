//! Shared application state handed to every handler

use std::sync::Arc;

use jsonrest_core::{ConversionContext, ConverterRegistry, ModelRegistry};
use jsonrest_orm::Datastore;

use crate::auth::Authenticator;
use crate::config::HttpConfig;

/// Registries, datastore and policy, built once at startup and shared
/// read-only across requests
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<ModelRegistry>,
    pub converters: Arc<ConverterRegistry>,
    pub store: Arc<dyn Datastore>,
    pub config: Arc<HttpConfig>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
}

impl ApiState {
    /// State with the builtin converters and no authentication
    pub fn new(registry: ModelRegistry, store: Arc<dyn Datastore>, config: HttpConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            converters: Arc::new(ConverterRegistry::with_builtins()),
            store,
            config: Arc::new(config),
            authenticator: None,
        }
    }

    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = Arc::new(converters);
        self
    }

    pub fn with_authenticator(mut self, authenticator: impl Authenticator) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Conversion context resolving references through the model registry
    pub fn conversion_context(&self) -> ConversionContext<'_> {
        ConversionContext::new(&self.converters, self.registry.as_ref())
    }
}
