#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! ldgen entity extraction and validation
//!
//! This crate turns the raw operation nodes of a resolved specification into
//! typed entities ([`ir::Route`], [`ir::Query`], [`ir::DataSource`],
//! [`ir::PipeModuleReference`]) and validates a whole specification before
//! any artifact is written.

use registry::DuplicateNameError;
use thiserror::Error;

pub mod extract;
pub mod normalizer;
pub mod validator;

pub use extract::{
    extract_data_sources, extract_operation, extract_pipe_module_references, extract_query,
    extract_route, ExtractedOperation,
};
pub use normalizer::{collapse_whitespace, derive_query_name, normalize_path};
pub use validator::{validate, SpecValidator, ValidationSummary};

/// Errors produced while extracting entities from a specification.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The method key is not one of the recognized verbs.
    #[error("invalid routing method '{method}' for path {path}")]
    InvalidRoutingMethod {
        /// Method as declared
        method: String,
        /// Path as declared
        path: String,
    },
    /// An operation node is missing required fields or has the wrong shape.
    #[error("malformed operation {method} {path}: {reason}")]
    MalformedOperation {
        /// Method as declared
        method: String,
        /// Path as declared
        path: String,
        /// What is wrong
        reason: String,
    },
    /// The `datasources` section has the wrong shape.
    #[error("malformed datasources: {0}")]
    MalformedDataSources(String),
    /// The JSON-LD context could not be read.
    #[error("invalid json-ld-context for {method} {path}: {reason}")]
    InvalidContext {
        /// Method as declared
        method: String,
        /// Path as declared
        path: String,
        /// Parser message
        reason: String,
    },
    /// A derived or declared name cannot be used as an identifier.
    #[error("'{name}' declared by {method} {path} is not a valid identifier")]
    InvalidIdentifier {
        /// Offending name
        name: String,
        /// Method as declared
        method: String,
        /// Path as declared
        path: String,
    },
    /// Two entities share a canonical name.
    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),
}

/// Result alias for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;
