//! Declaration backend - builds a unit manifest from the type body
//!
//! The body is everything between the first `{` and the final `}`. Each
//! top-level member ends either with `;` or with a closing brace block.

use crate::backend::{Backend, BackendMetadata};
use crate::error::BackendError;
use crate::ident::UnitIdentifier;
use crate::loader::UnitLoader;

/// Result of compiling a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitManifest {
    pub identifier: UnitIdentifier,
    pub namespace: String,
    pub name: String,
    /// Top-level members in declaration order, whitespace-trimmed
    pub members: Vec<String>,
    pub source_len: usize,
}

/// Built-in backend producing [`UnitManifest`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationBackend;

impl DeclarationBackend {
    pub fn new() -> Self {
        Self
    }

    /// Parse `source` into a manifest without registering it
    pub fn parse(
        &self,
        identifier: &UnitIdentifier,
        source: &str,
    ) -> Result<UnitManifest, BackendError> {
        check_balance(identifier, source)?;

        let syntax = |message: String| BackendError::Syntax {
            identifier: identifier.clone(),
            message,
        };
        let open = source
            .find('{')
            .ok_or_else(|| syntax("missing type body".to_string()))?;
        let close = source
            .rfind('}')
            .ok_or_else(|| syntax("missing closing brace".to_string()))?;

        let members = split_members(&source[open + 1..close]).map_err(syntax)?;

        Ok(UnitManifest {
            identifier: identifier.clone(),
            namespace: identifier.namespace().to_string(),
            name: identifier.short_name().to_string(),
            members,
            source_len: source.len(),
        })
    }
}

impl<L> Backend<L> for DeclarationBackend
where
    L: UnitLoader,
    L::Unit: From<UnitManifest>,
{
    fn metadata(&self) -> BackendMetadata {
        BackendMetadata::new(
            "declaration",
            "0.1.0",
            Some("Builds a member manifest from the type body"),
        )
    }

    fn compile(
        &self,
        loader: &L,
        identifier: &UnitIdentifier,
        source: &str,
    ) -> Result<L::Unit, BackendError> {
        let manifest = self.parse(identifier, source)?;
        tracing::debug!(
            target: "unitgate::compile",
            unit = %identifier,
            members = manifest.members.len(),
            "declaration parsed"
        );

        let unit = L::Unit::from(manifest);
        loader.register(identifier.clone(), unit.clone());
        Ok(unit)
    }
}

fn check_balance(identifier: &UnitIdentifier, source: &str) -> Result<(), BackendError> {
    let mut depth = 0usize;
    for (offset, ch) in source.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| BackendError::Syntax {
                    identifier: identifier.clone(),
                    message: format!("unexpected '}}' at offset {}", offset),
                })?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(BackendError::Syntax {
            identifier: identifier.clone(),
            message: format!("{} unclosed '{{'", depth),
        });
    }
    Ok(())
}

fn split_members(body: &str) -> Result<Vec<String>, String> {
    let mut members = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in body.chars() {
        match ch {
            ';' if depth == 0 => {
                push_member(&mut members, &current);
                current.clear();
            }
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
                if depth == 0 {
                    push_member(&mut members, &current);
                    current.clear();
                }
            }
            _ => current.push(ch),
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        return Err(format!("unterminated member '{}'", rest));
    }
    Ok(members)
}

fn push_member(members: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        members.push(text.to_string());
    }
}
