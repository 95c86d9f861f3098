#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Name Registry — the roster of identifiers committed to generated artifacts.
//!
//! Every name a writer exports is registered here before the text that
//! defines it is flushed. Writers that reference names owned by another
//! artifact consult the registry, so a cross-artifact reference can only
//! be emitted after its target has been committed.
//!
//! The registry is append-only and write-once per `(kind, name)`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace a registered name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NameKind {
    /// Query definitions exported by the query-execution artifact
    Query,
    /// Functions exported by the pipe-module artifact
    PipeModule,
}

impl NameKind {
    /// Human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            NameKind::Query => "query",
            NameKind::PipeModule => "pipe-module",
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Two entities resolved to the same canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "duplicate {kind} name '{name}'{}",
    .context.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default()
)]
pub struct DuplicateNameError {
    /// Namespace of the collision
    pub kind: NameKind,
    /// The colliding name
    pub name: String,
    /// Optional description of the colliding declarations
    pub context: Option<String>,
}

impl DuplicateNameError {
    /// Create an error without extra context.
    pub fn new(kind: NameKind, name: impl Into<String>) -> Self {
        Self { kind, name: name.into(), context: None }
    }

    /// Attach a description of where the collision happened.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Thread-safe append-only registry of names, grouped by [`NameKind`].
///
/// Shared between writers through an `Arc`; names are returned in the
/// order they were registered.
#[derive(Debug, Default)]
pub struct NameRegistry {
    inner: Mutex<BTreeMap<NameKind, Vec<String>>>,
}

impl NameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self { Self::default() }

    /// Register `name` under `kind`.
    ///
    /// Fails without modifying the registry if the name is already present.
    pub fn register(&self, kind: NameKind, name: &str) -> Result<(), DuplicateNameError> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let names = map.entry(kind).or_default();
        if names.iter().any(|n| n == name) {
            return Err(DuplicateNameError::new(kind, name));
        }
        names.push(name.to_string());
        Ok(())
    }

    /// Whether `name` has been registered under `kind`.
    pub fn contains(&self, kind: NameKind, name: &str) -> bool {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&kind).is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// All names registered under `kind`, in registration order.
    pub fn names_for(&self, kind: NameKind) -> Vec<String> {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&kind).cloned().unwrap_or_default()
    }

    /// The most recently registered name under `kind`.
    pub fn last_for(&self, kind: NameKind) -> Option<String> {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&kind).and_then(|names| names.last().cloned())
    }

    /// Number of names registered under `kind`.
    pub fn count(&self, kind: NameKind) -> usize {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&kind).map_or(0, Vec::len)
    }
}
