//! Backend registry
//!
//! Holds named backends and a default name, so callers can pick a
//! toolchain by name or fall back to the configured one.

use crate::backend::Backend;
use crate::backends::DeclarationBackend;
use crate::backends::declaration::UnitManifest;
use crate::error::RegistryError;
use crate::loader::UnitLoader;
use std::collections::HashMap;
use std::sync::Arc;
use unitgate_config::DEFAULT_BACKEND;

/// Registry of backends usable with loaders of type `L`
pub struct BackendRegistry<L: UnitLoader> {
    backends: HashMap<String, Arc<dyn Backend<L>>>,
    default: Option<String>,
}

impl<L: UnitLoader> Default for BackendRegistry<L> {
    fn default() -> Self {
        Self {
            backends: HashMap::new(),
            default: None,
        }
    }
}

impl<L: UnitLoader> std::fmt::Debug for BackendRegistry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("count", &self.backends.len())
            .field("default", &self.default)
            .finish()
    }
}

impl<L: UnitLoader> BackendRegistry<L> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its metadata name
    pub fn register(&mut self, backend: Arc<dyn Backend<L>>) {
        let name = backend.metadata().name.to_string();
        self.backends.insert(name, backend);
    }

    /// Set the name used by `select(None)`
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default = Some(name.into());
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Get a backend by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend<L>>> {
        self.backends.get(name).cloned()
    }

    /// Check if a backend exists
    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Get all backend names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Pick the named backend, or the default one when `name` is `None`
    pub fn select(&self, name: Option<&str>) -> Result<Arc<dyn Backend<L>>, RegistryError> {
        let name = match name {
            Some(name) => name,
            None => self.default.as_deref().ok_or(RegistryError::NoDefault)?,
        };
        self.get(name).ok_or_else(|| RegistryError::UnknownBackend {
            name: name.to_string(),
            available: self.names(),
        })
    }
}

impl<L> BackendRegistry<L>
where
    L: UnitLoader,
    L::Unit: From<UnitManifest>,
{
    /// Registry holding the built-in backends, with `declaration` as default
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DeclarationBackend::new()));
        registry.set_default(DEFAULT_BACKEND);
        registry
    }
}
