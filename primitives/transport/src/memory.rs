//! Scripted in-memory transport for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{Result, Transport, TransportError};

#[derive(Clone)]
struct Entry {
    response: Result<String>,
    delay: Duration,
}

/// A [`Transport`] answering from a fixed table.
///
/// Unknown locations fail with a `404` status error. Every call is recorded,
/// in call order, so tests can assert which locations were requested, along
/// with the highest number of calls that were in flight at once.
#[derive(Default)]
pub struct MemoryTransport {
    entries: HashMap<String, Entry>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self { Self::default() }

    /// Serve `body` for `location`.
    pub fn with(self, location: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_delayed(location, body, Duration::ZERO)
    }

    /// Serve `body` for `location` after sleeping for `delay`.
    pub fn with_delayed(
        mut self,
        location: impl Into<String>,
        body: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.entries.insert(location.into(), Entry { response: Ok(body.into()), delay });
        self
    }

    /// Fail requests for `location` with `error`.
    pub fn with_error(mut self, location: impl Into<String>, error: TransportError) -> Self {
        self.entries.insert(location.into(), Entry { response: Err(error), delay: Duration::ZERO });
        self
    }

    /// Locations requested so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Highest number of fetches that were pending at the same time.
    pub fn peak_in_flight(&self) -> usize { self.peak_in_flight.load(Ordering::SeqCst) }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn fetch(&self, location: &str) -> Result<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(location.to_string());

        let Some(entry) = self.entries.get(location).cloned() else {
            return Err(TransportError::Status { location: location.to_string(), status: 404 });
        };
        let pending = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(pending, Ordering::SeqCst);
        if !entry.delay.is_zero() {
            tokio::time::sleep(entry.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        entry.response
    }

    fn name(&self) -> &str { "memory" }
}
