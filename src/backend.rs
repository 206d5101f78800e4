//! Backend trait definitions
//!
//! A backend turns source text into a loadable unit and registers it with
//! the loader it was given.

use crate::error::BackendError;
use crate::ident::UnitIdentifier;
use crate::loader::UnitLoader;

/// Metadata about a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendMetadata {
    /// The backend name (unique identifier in a registry)
    pub name: &'static str,
    /// The backend version
    pub version: &'static str,
    /// Optional description
    pub description: Option<&'static str>,
}

impl BackendMetadata {
    /// Create new metadata
    pub fn new(
        name: &'static str,
        version: &'static str,
        description: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            version,
            description,
        }
    }
}

/// Pluggable compilation toolchain
///
/// On success the produced unit must already be registered with `loader`,
/// so that a later `resolve(identifier)` finds it.
pub trait Backend<L: UnitLoader>: Send + Sync {
    /// Get the backend metadata
    fn metadata(&self) -> BackendMetadata;

    /// Compile `source` into the unit named `identifier`
    fn compile(
        &self,
        loader: &L,
        identifier: &UnitIdentifier,
        source: &str,
    ) -> Result<L::Unit, BackendError>;
}

/// Helper methods for backends
pub trait BackendExt<L: UnitLoader>: Backend<L> {
    /// Get the backend name
    fn name(&self) -> &'static str {
        self.metadata().name
    }
}

impl<L: UnitLoader, T: Backend<L> + ?Sized> BackendExt<L> for T {}
