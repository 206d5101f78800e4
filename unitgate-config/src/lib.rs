//! Unitgate Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across the Unitgate crates.

use serde::Deserialize;

/// Name of the backend used when nothing else is configured
pub const DEFAULT_BACKEND: &str = "declaration";

/// Configuration for a compile gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Backend selected when the caller does not name one
    pub default_backend: String,
    /// Initial capacity of the per-identifier lock table
    pub initial_lock_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            default_backend: DEFAULT_BACKEND.to_string(),
            initial_lock_capacity: 64,
        }
    }
}

/// Gate phase, used for phase-specific log filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Extract,
    Lock,
    Resolve,
    Compile,
}

impl Phase {
    /// All phases, in pipeline order
    pub const ALL: [Phase; 4] = [Phase::Extract, Phase::Lock, Phase::Resolve, Phase::Compile];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Extract => "extract",
            Phase::Lock => "lock",
            Phase::Resolve => "resolve",
            Phase::Compile => "compile",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("unitgate::{}", self.as_str())
    }
}

/// Log level names accepted in project files
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Project file (`unitgate.json`) structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    /// Source files, relative to the project file
    #[serde(default)]
    pub sources: Vec<String>,
    /// Backend name override
    pub backend: Option<String>,
    /// Number of worker threads
    pub jobs: Option<usize>,
    /// Global log level
    pub log_level: Option<LogLevel>,
}

impl ProjectConfig {
    /// Parse a project file from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Build the gate configuration this project asks for
    pub fn gate_config(&self) -> GateConfig {
        let mut cfg = GateConfig::default();
        if let Some(backend) = &self.backend {
            cfg.default_backend = backend.clone();
        }
        cfg
    }
}
