//! Loader trait and types
//!
//! A loader is the registry of units that already exist. The gate reads
//! from it; backends write to it as a side effect of compiling.

use crate::ident::UnitIdentifier;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Outcome of looking a unit up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<U> {
    Found(U),
    NotFound,
}

impl<U> Resolution<U> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// Convert into an `Option`
    pub fn found(self) -> Option<U> {
        match self {
            Resolution::Found(unit) => Some(unit),
            Resolution::NotFound => None,
        }
    }
}

impl<U> From<Option<U>> for Resolution<U> {
    fn from(value: Option<U>) -> Self {
        match value {
            Some(unit) => Resolution::Found(unit),
            None => Resolution::NotFound,
        }
    }
}

/// Resolver and registry of loadable units
///
/// Must tolerate concurrent calls for different identifiers. Repeated calls
/// for the same identifier are serialized by the gate.
pub trait UnitLoader: Send + Sync {
    /// Handle returned to callers
    type Unit: Clone + Send + Sync;

    /// Look up an already registered unit
    fn resolve(&self, identifier: &UnitIdentifier) -> Resolution<Self::Unit>;

    /// Register a freshly produced unit
    fn register(&self, identifier: UnitIdentifier, unit: Self::Unit);
}

/// In-memory loader with optional parent-first delegation
pub struct MemoryLoader<U: Clone + Send + Sync> {
    units: RwLock<HashMap<UnitIdentifier, U>>,
    parent: Option<Arc<dyn UnitLoader<Unit = U>>>,
}

impl<U: Clone + Send + Sync> Default for MemoryLoader<U> {
    fn default() -> Self {
        Self {
            units: RwLock::new(HashMap::new()),
            parent: None,
        }
    }
}

impl<U: Clone + Send + Sync> std::fmt::Debug for MemoryLoader<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLoader")
            .field("count", &self.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl<U: Clone + Send + Sync> MemoryLoader<U> {
    /// Create a new empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that asks `parent` before its own units
    pub fn with_parent(parent: Arc<dyn UnitLoader<Unit = U>>) -> Self {
        Self {
            units: RwLock::new(HashMap::new()),
            parent: Some(parent),
        }
    }

    /// Check whether this loader itself holds `identifier`
    pub fn contains(&self, identifier: &str) -> bool {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(identifier)
    }

    /// Number of units registered directly with this loader
    pub fn len(&self) -> usize {
        self.units.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<U: Clone + Send + Sync> UnitLoader for MemoryLoader<U> {
    type Unit = U;

    fn resolve(&self, identifier: &UnitIdentifier) -> Resolution<U> {
        if let Some(parent) = &self.parent {
            if let Resolution::Found(unit) = parent.resolve(identifier) {
                return Resolution::Found(unit);
            }
        }
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
            .into()
    }

    fn register(&self, identifier: UnitIdentifier, unit: U) {
        tracing::debug!(target: "unitgate::resolve", unit = %identifier, "unit registered");
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier, unit);
    }
}
