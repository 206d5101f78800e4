//! The compile gate
//!
//! Derives a unit identifier from source text, serializes work per
//! identifier, reuses units the loader already has and otherwise hands the
//! source to a backend. The loader is the only record of what has been
//! compiled; the gate keeps no success cache of its own.

use crate::backend::Backend;
use crate::error::{GateError, MalformedReason, RegistryError};
use crate::ident::UnitIdentifier;
use crate::loader::{Resolution, UnitLoader};
use crate::lock_table::LockTable;
use crate::registry::BackendRegistry;
use std::sync::Arc;
use unitgate_config::GateConfig;

/// Where a returned unit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Already registered with the loader
    Resolved,
    /// Produced by the backend during this call
    Compiled,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Resolved => "resolved",
            Origin::Compiled => "compiled",
        }
    }
}

/// A unit together with its identifier and provenance
#[derive(Debug, Clone)]
pub struct Compiled<U> {
    pub unit: U,
    pub identifier: UnitIdentifier,
    pub origin: Origin,
}

/// Compile-once gate over a backend
pub struct CompileGate<L: UnitLoader> {
    backend: Arc<dyn Backend<L>>,
    locks: Arc<LockTable>,
}

impl<L: UnitLoader> Clone for CompileGate<L> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<L: UnitLoader> std::fmt::Debug for CompileGate<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileGate")
            .field("backend", &self.backend.metadata().name)
            .field("locks", &self.locks.len())
            .finish()
    }
}

impl<L: UnitLoader> CompileGate<L> {
    /// Create a gate with its own lock table
    pub fn new(backend: Arc<dyn Backend<L>>) -> Self {
        Self::with_lock_table(backend, Arc::new(LockTable::new()))
    }

    /// Create a gate that serializes through a shared lock table
    pub fn with_lock_table(backend: Arc<dyn Backend<L>>, locks: Arc<LockTable>) -> Self {
        Self { backend, locks }
    }

    /// Create a gate over a backend picked from `registry`
    pub fn from_registry(
        registry: &BackendRegistry<L>,
        name: Option<&str>,
        locks: Arc<LockTable>,
    ) -> Result<Self, RegistryError> {
        Ok(Self::with_lock_table(registry.select(name)?, locks))
    }

    /// Create a gate as described by `config`
    pub fn from_config(
        registry: &BackendRegistry<L>,
        config: &GateConfig,
    ) -> Result<Self, RegistryError> {
        let locks = Arc::new(LockTable::with_capacity(config.initial_lock_capacity));
        Self::from_registry(registry, Some(&config.default_backend), locks)
    }

    pub fn lock_table(&self) -> &Arc<LockTable> {
        &self.locks
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.metadata().name
    }

    /// Compile `source`, or return the unit the loader already holds
    pub fn compile(&self, source: &str, loader: &L) -> Result<L::Unit, GateError> {
        self.compile_traced(source, loader).map(|compiled| compiled.unit)
    }

    /// Like [`compile`](Self::compile), also reporting the identifier and
    /// whether the backend ran
    pub fn compile_traced(&self, source: &str, loader: &L) -> Result<Compiled<L::Unit>, GateError> {
        let source = source.trim();
        let identifier = UnitIdentifier::extract(source)?;
        tracing::trace!(target: "unitgate::extract", unit = %identifier, "identifier extracted");

        let lock = self.locks.lock_for(&identifier);
        let guard = LockTable::acquire(&lock);
        tracing::trace!(target: "unitgate::lock", unit = %identifier, "lock acquired");

        let result = self.resolve_or_compile(source, &identifier, loader);

        drop(guard);
        tracing::trace!(target: "unitgate::lock", unit = %identifier, "lock released");

        let (unit, origin) = result?;
        Ok(Compiled {
            unit,
            identifier,
            origin,
        })
    }

    fn resolve_or_compile(
        &self,
        source: &str,
        identifier: &UnitIdentifier,
        loader: &L,
    ) -> Result<(L::Unit, Origin), GateError> {
        if let Resolution::Found(unit) = loader.resolve(identifier) {
            tracing::debug!(target: "unitgate::resolve", unit = %identifier, "resolved from loader");
            return Ok((unit, Origin::Resolved));
        }

        if !source.ends_with('}') {
            return Err(GateError::malformed(MalformedReason::MissingClosingBrace, source));
        }

        tracing::debug!(
            target: "unitgate::compile",
            unit = %identifier,
            backend = self.backend.metadata().name,
            "compiling"
        );
        match self.backend.compile(loader, identifier, source) {
            Ok(unit) => Ok((unit, Origin::Compiled)),
            Err(err) => {
                let err = GateError::from_backend(err, identifier, source);
                tracing::warn!(target: "unitgate::compile", unit = %identifier, error = %err, "compilation failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendMetadata;
    use crate::backends::{DeclarationBackend, UnitManifest};
    use crate::error::BackendError;
    use crate::loader::MemoryLoader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Loader = MemoryLoader<UnitManifest>;

    /// Declaration backend that counts its invocations
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl Backend<Loader> for Counting {
        fn metadata(&self) -> BackendMetadata {
            BackendMetadata::new("counting", "0.0.1", None)
        }

        fn compile(
            &self,
            loader: &Loader,
            identifier: &UnitIdentifier,
            source: &str,
        ) -> Result<UnitManifest, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DeclarationBackend::new().compile(loader, identifier, source)
        }
    }

    /// Backend that never registers anything
    struct Forgetful;

    impl Backend<Loader> for Forgetful {
        fn metadata(&self) -> BackendMetadata {
            BackendMetadata::new("forgetful", "0.0.1", None)
        }

        fn compile(
            &self,
            _loader: &Loader,
            identifier: &UnitIdentifier,
            source: &str,
        ) -> Result<UnitManifest, BackendError> {
            DeclarationBackend::new().parse(identifier, source)
        }
    }

    fn counting_gate() -> (CompileGate<Loader>, Arc<Counting>) {
        let backend = Arc::new(Counting::default());
        let gate: CompileGate<Loader> = CompileGate::new(backend.clone());
        (gate, backend)
    }

    #[test]
    fn test_compile_then_resolve() {
        let (gate, backend) = counting_gate();
        let loader = Loader::new();

        let first = gate.compile_traced("  namespace a.b; type Foo { x; }\n", &loader).unwrap();
        let second = gate.compile_traced("namespace a.b; type Foo { x; }", &loader).unwrap();

        assert_eq!(first.identifier.as_str(), "a.b.Foo");
        assert_eq!(first.origin, Origin::Compiled);
        assert_eq!(second.origin, Origin::Resolved);
        assert_eq!(first.unit, second.unit);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_hit_skips_brace_check() {
        let (gate, backend) = counting_gate();
        let loader = Loader::new();
        gate.compile("type Foo { }", &loader).unwrap();

        let unit = gate.compile("type Foo { ", &loader).unwrap();

        assert_eq!(unit.name, "Foo");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_closing_brace() {
        let (gate, backend) = counting_gate();
        let loader = Loader::new();

        let err = gate.compile("type Foo { ", &loader).unwrap_err();

        assert_eq!(err.malformed_reason(), Some(MalformedReason::MissingClosingBrace));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(gate.lock_table().contains("Foo"));
    }

    #[test]
    fn test_missing_type_declaration() {
        let (gate, _) = counting_gate();
        let loader = Loader::new();

        let err = gate.compile("struct Foo { }", &loader).unwrap_err();

        assert_eq!(err.malformed_reason(), Some(MalformedReason::MissingTypeDeclaration));
        assert!(gate.lock_table().is_empty());
    }

    #[test]
    fn test_no_local_cache() {
        let gate: CompileGate<Loader> = CompileGate::new(Arc::new(Forgetful));
        let loader = Loader::new();

        let first = gate.compile_traced("type Foo { }", &loader).unwrap();
        let second = gate.compile_traced("type Foo { }", &loader).unwrap();

        assert_eq!(first.origin, Origin::Compiled);
        assert_eq!(second.origin, Origin::Compiled);
    }

    #[test]
    fn test_syntax_error_propagates_unchanged() {
        let gate: CompileGate<Loader> = CompileGate::new(Arc::new(DeclarationBackend::new()));
        let loader = Loader::new();

        let err = gate.compile("type Foo { stray }", &loader).unwrap_err();

        assert!(matches!(err, GateError::Backend(BackendError::Syntax { .. })));
        assert_eq!(err.identifier().map(|id| id.as_str()), Some("Foo"));
        assert!(loader.is_empty());
    }

    #[test]
    fn test_from_config() {
        let registry = BackendRegistry::<Loader>::with_builtins();
        let gate = CompileGate::from_config(&registry, &GateConfig::default()).unwrap();
        assert_eq!(gate.backend_name(), "declaration");

        let config = GateConfig {
            default_backend: "missing".to_string(),
            ..GateConfig::default()
        };
        assert!(CompileGate::from_config(&registry, &config).is_err());
    }

    #[test]
    fn test_gates_sharing_a_table() {
        let locks = Arc::new(LockTable::new());
        let backend: Arc<dyn Backend<Loader>> = Arc::new(DeclarationBackend::new());
        let left = CompileGate::with_lock_table(backend.clone(), locks.clone());
        let right = CompileGate::with_lock_table(backend, locks.clone());
        let loader = Loader::new();

        left.compile("type A { }", &loader).unwrap();
        right.compile("type B { }", &loader).unwrap();

        assert_eq!(locks.len(), 2);
        assert!(Arc::ptr_eq(left.lock_table(), right.lock_table()));
    }
}
