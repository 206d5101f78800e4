//! Error types for the compile gate

use crate::ident::UnitIdentifier;
use std::fmt;
use thiserror::Error;

/// Why a source block was rejected before compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// No `type <Name>` declaration could be found
    MissingTypeDeclaration,
    /// The trimmed source does not end with `}`
    MissingClosingBrace,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingTypeDeclaration => write!(f, "no type declaration found"),
            MalformedReason::MissingClosingBrace => write!(f, "source does not end with \"}}\""),
        }
    }
}

/// Main gate error type
#[derive(Error, Debug)]
pub enum GateError {
    #[error("malformed source: {reason}, code:\n{source_text}\n")]
    MalformedSource {
        reason: MalformedReason,
        source_text: String,
    },

    #[error("failed to compile unit {identifier}, cause: {cause}, code:\n{source_text}\n")]
    CompilationFailed {
        identifier: UnitIdentifier,
        cause: String,
        /// Rendered `source()` chain of the original failure, outermost first
        chain: Vec<String>,
        source_text: String,
    },

    #[error(transparent)]
    Backend(BackendError),
}

impl GateError {
    pub(crate) fn malformed(reason: MalformedReason, source_text: &str) -> Self {
        GateError::MalformedSource {
            reason,
            source_text: source_text.to_string(),
        }
    }

    /// Classify a backend failure: recognized kinds pass through, anything
    /// else becomes `CompilationFailed`.
    pub(crate) fn from_backend(
        err: BackendError,
        identifier: &UnitIdentifier,
        source_text: &str,
    ) -> Self {
        match err {
            BackendError::Unexpected(cause) => GateError::CompilationFailed {
                identifier: identifier.clone(),
                cause: cause.to_string(),
                chain: render_chain(cause.as_ref()),
                source_text: source_text.to_string(),
            },
            recognized => GateError::Backend(recognized),
        }
    }

    /// The structural rejection reason, if this is a malformed-source error
    pub fn malformed_reason(&self) -> Option<MalformedReason> {
        match self {
            GateError::MalformedSource { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// The identifier involved, when one was derived
    pub fn identifier(&self) -> Option<&UnitIdentifier> {
        match self {
            GateError::CompilationFailed { identifier, .. } => Some(identifier),
            GateError::Backend(BackendError::Syntax { identifier, .. }) => Some(identifier),
            _ => None,
        }
    }
}

fn render_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}

/// Error type for backend components
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("syntax error in {identifier}: {message}")]
    Syntax {
        identifier: UnitIdentifier,
        message: String,
    },

    #[error("toolchain '{backend}' failed: {message}")]
    Toolchain {
        backend: String,
        message: String,
    },

    #[error("{0}")]
    Unexpected(Box<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Wrap an arbitrary failure as unexpected
    pub fn unexpected<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        BackendError::Unexpected(err.into())
    }
}

/// Error type for backend selection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown backend '{name}', available: [{}]", available.join(", "))]
    UnknownBackend {
        name: String,
        available: Vec<String>,
    },

    #[error("no default backend configured")]
    NoDefault,
}
