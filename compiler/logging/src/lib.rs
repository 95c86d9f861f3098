#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging utilities for the compiler.
//!
//! Library crates log through `tracing` macros; the binary calls [`init`]
//! once to install a subscriber.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive
    #[error("invalid log level '{level}': {reason}")]
    InvalidLevel {
        /// Rejected directive
        level: String,
        /// Parser message
        reason: String,
    },
    /// The log file could not be opened
    #[error("cannot open log file: {0}")]
    File(#[from] std::io::Error),
    /// A global subscriber is already installed
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Emits a trace event tagged with the originating module.
pub fn trace(module: &str, msg: &str) {
    tracing::trace!(module = module, "{}", msg);
}

/// Build the filter: `RUST_LOG` wins, otherwise `level`.
pub fn filter_for(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| LoggingError::InvalidLevel { level: level.to_string(), reason: e.to_string() })
}

/// Install the global subscriber.
///
/// Logs go to stderr, or are appended to `file` when one is given.
pub fn init(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
    let filter = filter_for(level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}
