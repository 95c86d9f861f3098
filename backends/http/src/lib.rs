#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `ldgen-http` — Transport Backends for ldgen
//!
//! Concrete implementations of [`transport::Transport`]:
//!
//! - [`HttpTransport`], a thin wrapper over [`reqwest::Client`] issuing `GET`
//!   requests and treating any non-2xx status as an error
//! - [`FileTransport`], reading `file://` URIs and plain filesystem paths
//! - [`RoutingTransport`], dispatching to one of the two by location scheme
//!
//! ## Example
//! ```no_run
//! use ldgen_http::RoutingTransport;
//! use transport::Transport;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport = RoutingTransport::new(Default::default()).unwrap();
//! let code = transport.fetch("https://example.org/pipes/filter.js").await.unwrap();
//! println!("{}", code);
//! # });
//! ```

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use transport::{is_remote, Transport, TransportConfig, TransportError};

/// A [`Transport`] fetching `http://` and `https://` locations.
///
/// Redirects are followed by the underlying client. No timeout is applied
/// unless one is configured.
#[derive(Clone)]
pub struct HttpTransport {
    /// The underlying HTTP client used to perform requests.
    client: reqwest::Client,
}

impl HttpTransport {
    /// Constructs a transport with default client settings.
    pub fn new() -> Self { Self { client: reqwest::Client::new() } }

    /// Constructs a transport honouring timeout and user agent settings.
    ///
    /// # Errors
    /// Returns `TransportError::Other` if the client cannot be built (for
    /// instance when the TLS backend fails to initialise).
    pub fn with_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Default for HttpTransport {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Issues a `GET` and returns the body text.
    ///
    /// # Errors
    /// - [`TransportError::Http`] if the request or body read fails
    /// - [`TransportError::Status`] if the status is not 2xx
    async fn fetch(&self, location: &str) -> Result<String, TransportError> {
        logging::trace("HTTP", &format!("→ GET {}", location));
        let resp = self.client.get(location).send().await.map_err(|e| {
            tracing::error!("HTTP Transport - Request to {} failed: {}", location, e);
            TransportError::Http(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!("HTTP Transport - {} answered {}", location, status);
            return Err(TransportError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| {
            tracing::error!("HTTP Transport - Failed to read body of {}: {}", location, e);
            TransportError::Http(e.to_string())
        })
    }

    fn name(&self) -> &str { "http" }
}

/// A [`Transport`] reading local files.
///
/// Accepts `file://` URIs and plain paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileTransport;

impl FileTransport {
    /// Filesystem path designated by `location`.
    pub fn path_of(location: &str) -> PathBuf {
        PathBuf::from(location.strip_prefix("file://").unwrap_or(location))
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn fetch(&self, location: &str) -> Result<String, TransportError> {
        let path = Self::path_of(location);
        logging::trace("FILE", &format!("→ read {}", path.display()));
        tokio::fs::read_to_string(&path).await.map_err(|e| TransportError::Io {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &str { "file" }
}

/// Dispatches remote locations to [`HttpTransport`] and everything else to
/// [`FileTransport`].
#[derive(Clone)]
pub struct RoutingTransport {
    http: HttpTransport,
    file: FileTransport,
}

impl RoutingTransport {
    /// Build both backends from `config`.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        Ok(Self { http: HttpTransport::with_config(&config)?, file: FileTransport })
    }
}

#[async_trait]
impl Transport for RoutingTransport {
    async fn fetch(&self, location: &str) -> Result<String, TransportError> {
        if is_remote(location) {
            self.http.fetch(location).await
        } else if location.contains("://") && !location.starts_with("file://") {
            Err(TransportError::UnsupportedScheme(location.to_string()))
        } else {
            self.file.fetch(location).await
        }
    }

    fn name(&self) -> &str { "routing" }
}
