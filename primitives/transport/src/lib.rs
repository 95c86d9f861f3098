#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `ldgen-transport` — Source Acquisition Layer
//!
//! This crate defines the **transport abstraction** the compiler uses to
//! acquire text it does not own: remote specification fragments and
//! pipe-module source code.
//!
//! ## Core Concepts
//!
//! ### `Transport` Trait
//! A single operation, [`Transport::fetch`], turns a location string into
//! the text stored there. Retries, TLS and redirects belong to the backend
//! (see `ldgen-http`); the compiler only sees success or a
//! [`TransportError`].
//!
//! ### `DynTransport`
//! A type-erased (`Arc<dyn Transport>`) handle so the resolver, the
//! pipe-module loader and tests can share one backend without generics.
//!
//! ### `MemoryTransport` (feature `test-utils`)
//! A scripted in-memory backend with per-location latency, used to test
//! ordering and failure behaviour without a network.
//!
//! ## Example
//! ```no_run
//! use transport::{DynTransport, TransportError};
//!
//! async fn demo(transport: DynTransport) -> Result<(), TransportError> {
//!     let code = transport.fetch("https://example.org/pipes/filter.js").await?;
//!     println!("{} bytes", code.len());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "test-utils")]
pub mod memory;

#[cfg(feature = "test-utils")]
pub use memory::MemoryTransport;

/// Type alias for structured error handling in transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Canonical error type for all transport implementations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be completed (connection refused, DNS, timeout).
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The server answered with a non-success status code.
    #[error("{location} answered with status {status}")]
    Status {
        /// Requested location
        location: String,
        /// HTTP status code
        status: u16,
    },

    /// A local file could not be read.
    #[error("I/O error reading {location}: {reason}")]
    Io {
        /// Requested location
        location: String,
        /// Underlying error message
        reason: String,
    },

    /// No backend handles the location's scheme.
    #[error("Unsupported location scheme: {0}")]
    UnsupportedScheme(String),

    /// Any other error not covered by the specific variants above.
    #[error("Other error: {0}")]
    Other(String),
}

/// A backend able to fetch text from a location.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the text stored at `location`.
    ///
    /// Implementations return the body verbatim; callers decide whether to
    /// trim or parse it.
    async fn fetch(&self, location: &str) -> Result<String>;

    /// Short backend name used in log lines.
    fn name(&self) -> &str;
}

/// Type alias for a shared, dynamically dispatched transport instance.
pub type DynTransport = Arc<dyn Transport>;

/// Returns true when `location` is an absolute `http://` or `https://` URL.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Tunables for network backends.
///
/// No field is required; an empty table means the backend defaults (no
/// timeout, default user agent).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Value of the `User-Agent` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}
