//! Built-in backend implementations

pub mod declaration;

pub use declaration::{DeclarationBackend, UnitManifest};
