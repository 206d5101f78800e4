//! Unit identifiers and their extraction from source text
//!
//! The identifier is read straight off the text: the first
//! `namespace a.b.c;` declaration (optional) and the first `type Name`
//! declaration (required). Only the first occurrence of each counts, and
//! comments or string literals are not skipped.

use crate::error::{GateError, MalformedReason};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Borrow;
use std::fmt;

static NAMESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"namespace\s+([$_a-zA-Z][$_a-zA-Z0-9.]*);").expect("namespace pattern is valid")
});

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"type\s+([$_a-zA-Z][$_a-zA-Z0-9]*)\s+").expect("type pattern is valid")
});

/// Fully-qualified name of a loadable unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitIdentifier(String);

impl UnitIdentifier {
    /// Join a namespace prefix and a short name. An empty prefix yields the
    /// short name alone.
    pub fn new(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", namespace, name))
        }
    }

    /// Derive the identifier from a block of source text
    pub fn extract(source: &str) -> Result<Self, GateError> {
        let namespace = NAMESPACE_PATTERN
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map_or("", |m| m.as_str());

        let name = TYPE_PATTERN
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| GateError::malformed(MalformedReason::MissingTypeDeclaration, source))?;

        Ok(Self::new(namespace, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace prefix, empty when the unit is not namespaced
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(ns, _)| ns)
    }

    /// Unqualified name
    pub fn short_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for UnitIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UnitIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UnitIdentifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}
