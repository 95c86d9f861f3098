#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that compiles a specification into the three
//! generated artifacts.
//!
//! ## Module Organization
//!
//! - `loader` - concurrent fetching of one route's post-processing chain
//! - `emitter` - the `MultiArtifactEmitter` state machine driving the writers
//! - `orchestration` - entry points (`compile`, `compile_specification`)

use analysis::ExtractError;
use codegen::{CodegenError, TemplateError};
use registry::DuplicateNameError;
use resolver::ResolveError;
use thiserror::Error;

pub mod emitter;
pub mod loader;
pub mod orchestration;

pub use emitter::{CompileReport, EmitterState, MultiArtifactEmitter};
pub use loader::PipeModuleLoader;
pub use orchestration::{compile, compile_specification};

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the pipeline.
///
/// The four run-aborting conditions (unresolved reference, invalid routing
/// method, pipe-module fetch failure, duplicate name) are distinct variants
/// regardless of which stage detected them.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A `$ref` in the specification could not be dereferenced.
    #[error("unresolved reference '{location}' in {document}: {reason}")]
    UnresolvedReference {
        /// The reference as written
        location: String,
        /// Document containing it
        document: String,
        /// Why dereferencing failed
        reason: String,
    },
    /// An operation is declared under an unrecognized verb.
    #[error("invalid routing method '{method}' for path {path}")]
    InvalidRoutingMethod {
        /// Method as declared
        method: String,
        /// Path as declared
        path: String,
    },
    /// A pipe-module source could not be fetched.
    #[error("failed to fetch pipe-module '{name}' from {location}: {reason}")]
    PipeModuleFetch {
        /// Declared pipe-module name
        name: String,
        /// Source URI
        location: String,
        /// Transport error message
        reason: String,
    },
    /// Two entities share a canonical name.
    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),
    /// The specification could not be loaded.
    #[error(transparent)]
    Resolve(ResolveError),
    /// An entity could not be extracted.
    #[error(transparent)]
    Extract(ExtractError),
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(CodegenError),
    /// Template substitution failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// I/O error while creating or writing artifacts.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An emitter operation was called in the wrong state.
    #[error("emitter cannot {operation} while {state}")]
    InvalidState {
        /// Attempted operation
        operation: &'static str,
        /// State the emitter was in
        state: EmitterState,
    },
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
}

impl From<ResolveError> for PipelineError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnresolvedReference { location, document, reason } => {
                PipelineError::UnresolvedReference { location, document, reason }
            }
            other => PipelineError::Resolve(other),
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidRoutingMethod { method, path } => {
                PipelineError::InvalidRoutingMethod { method, path }
            }
            ExtractError::DuplicateName(dup) => PipelineError::DuplicateName(dup),
            other => PipelineError::Extract(other),
        }
    }
}

impl From<CodegenError> for PipelineError {
    fn from(err: CodegenError) -> Self {
        match err {
            CodegenError::DuplicateName(dup) => PipelineError::DuplicateName(dup),
            CodegenError::Template(err) => PipelineError::Template(err),
            CodegenError::Io(err) => PipelineError::Io(err),
            other => PipelineError::Codegen(other),
        }
    }
}
