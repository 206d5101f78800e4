//! Unitgate - compile-once gate for dynamically generated source units
//!
//! Given a block of source text, the gate derives the unit identifier from
//! the text, makes sure concurrent requests for the same identifier compile
//! at most once, reuses units a loader already holds and otherwise hands the
//! text to a pluggable backend.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── ident.rs       - identifier extraction
//! ├── lock_table.rs  - per-identifier locks
//! ├── loader.rs      - UnitLoader seam + MemoryLoader
//! ├── backend.rs     - Backend seam
//! ├── registry.rs    - named backends with a default
//! ├── gate.rs        - CompileGate
//! └── backends/      - built-in backends
//! ```
//!
//! # Quick Start
//!
//! ```
//! use unitgate::{BackendRegistry, CompileGate, MemoryLoader, UnitManifest};
//! use unitgate_config::GateConfig;
//!
//! let registry = BackendRegistry::<MemoryLoader<UnitManifest>>::with_builtins();
//! let gate = CompileGate::from_config(&registry, &GateConfig::default()).unwrap();
//! let loader = MemoryLoader::new();
//!
//! let unit = gate.compile("namespace demo; type Greeter { greet(); }", &loader).unwrap();
//! assert_eq!(unit.identifier.as_str(), "demo.Greeter");
//! ```

pub mod backend;
pub mod backends;
pub mod error;
pub mod gate;
pub mod ident;
pub mod loader;
pub mod lock_table;
pub mod registry;

pub use backend::{Backend, BackendExt, BackendMetadata};
pub use backends::{DeclarationBackend, UnitManifest};
pub use error::{BackendError, GateError, MalformedReason, RegistryError};
pub use gate::{CompileGate, Compiled, Origin};
pub use ident::UnitIdentifier;
pub use loader::{MemoryLoader, Resolution, UnitLoader};
pub use lock_table::{LockTable, UnitLock};
pub use registry::BackendRegistry;
pub use unitgate_config;
