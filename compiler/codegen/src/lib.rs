#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Artifact generation for ldgen.
//!
//! This crate turns extracted entities into the three generated JavaScript
//! modules: the query-execution module, the pipe-module module and the
//! routing module. It provides:
//!
//! - [`template`]: typed positional substitution (string, identifier, JSON
//!   and raw slots)
//! - [`sink`]: the output side ([`ArtifactSink`], [`FileSink`], [`MemorySink`])
//! - [`writers`]: one writer per artifact, each following a `begin` /
//!   `emit` / `end` protocol and flushing its buffer after every call
//!
//! Ordering between writers is not enforced here; the pipeline's emitter
//! drives them.

pub mod sink;
pub mod template;
pub mod writers;

use registry::{DuplicateNameError, NameKind};
use thiserror::Error;

pub use sink::{ArtifactKind, ArtifactSink, FileSink, MemorySink};
pub use template::{is_identifier, is_module_binding, render, Slot, Template, TemplateError};
pub use writers::{
    ArtifactWriter, PipeModuleWriter, QueryWriter, RouteBinding, RouteWriter, WriterPhase,
};

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Underlying I/O error while writing an artifact.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Template substitution failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A name was committed twice.
    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),
    /// A route references a name no writer has committed.
    #[error("route {route} references {kind} '{name}' which has not been emitted")]
    DanglingReference {
        /// Route description (`GET /path`)
        route: String,
        /// Namespace of the missing name
        kind: NameKind,
        /// The missing name
        name: String,
    },
    /// A writer operation was called in the wrong phase.
    #[error("cannot {operation} {artifact} while {phase}")]
    Phase {
        /// Artifact file name
        artifact: &'static str,
        /// Attempted operation
        operation: &'static str,
        /// Current writer phase
        phase: WriterPhase,
    },
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;
