//! Test helpers
//!
//! Backends with observable side effects for end-to-end gate tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

use unitgate::{
    Backend, BackendError, BackendMetadata, DeclarationBackend, MemoryLoader, UnitIdentifier,
    UnitManifest,
};

pub type Loader = MemoryLoader<UnitManifest>;

/// Counts calls, optionally sleeping inside the compile step so racing
/// callers pile up on the lock
#[derive(Default)]
pub struct CountingBackend {
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingBackend {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Backend<Loader> for CountingBackend {
    fn metadata(&self) -> BackendMetadata {
        BackendMetadata::new("counting", "0.0.1", Some("Counts compile calls"))
    }

    fn compile(
        &self,
        loader: &Loader,
        identifier: &UnitIdentifier,
        source: &str,
    ) -> Result<UnitManifest, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        DeclarationBackend::new().compile(loader, identifier, source)
    }
}

/// Blocks compiling `blocked` until released; every other unit compiles
/// immediately
pub struct GatedBackend {
    blocked: String,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl GatedBackend {
    pub fn new(blocked: &str, entered: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            blocked: blocked.to_string(),
            entered: Mutex::new(entered),
            release: Mutex::new(release),
        }
    }
}

impl Backend<Loader> for GatedBackend {
    fn metadata(&self) -> BackendMetadata {
        BackendMetadata::new("gated", "0.0.1", None)
    }

    fn compile(
        &self,
        loader: &Loader,
        identifier: &UnitIdentifier,
        source: &str,
    ) -> Result<UnitManifest, BackendError> {
        if identifier.as_str() == self.blocked {
            self.entered
                .lock()
                .unwrap()
                .send(())
                .map_err(BackendError::unexpected)?;
            self.release
                .lock()
                .unwrap()
                .recv()
                .map_err(BackendError::unexpected)?;
        }
        DeclarationBackend::new().compile(loader, identifier, source)
    }
}

/// Fails every compile with an error type the gate does not recognize
pub struct BrokenBackend;

#[derive(Debug)]
pub struct ToolchainCrash(pub String);

impl std::fmt::Display for ToolchainCrash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "toolchain crashed: {}", self.0)
    }
}

impl std::error::Error for ToolchainCrash {}

impl Backend<Loader> for BrokenBackend {
    fn metadata(&self) -> BackendMetadata {
        BackendMetadata::new("broken", "0.0.1", None)
    }

    fn compile(
        &self,
        _loader: &Loader,
        _identifier: &UnitIdentifier,
        _source: &str,
    ) -> Result<UnitManifest, BackendError> {
        Err(BackendError::unexpected(ToolchainCrash("exit code 139".to_string())))
    }
}

/// Source for a unit named `name` in namespace `namespace`
pub fn unit_source(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        format!("type {} {{\n    value: int;\n}}", name)
    } else {
        format!("namespace {};\ntype {} {{\n    value: int;\n}}", namespace, name)
    }
}
