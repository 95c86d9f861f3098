//! Pipe-Module Loader
//!
//! Fetches the sources of one route's post-processing chain. All fetches
//! are issued at once and joined with a single barrier; the result keeps
//! the declared order no matter which fetch settles first.

use futures::future::join_all;
use ir::{PipeModule, PipeModuleReference};
use transport::DynTransport;

use crate::{PipelineError, Result};

/// Loads pipe-module code through a [`transport::Transport`].
#[derive(Clone)]
pub struct PipeModuleLoader {
    transport: DynTransport,
}

impl PipeModuleLoader {
    /// Create a loader fetching through `transport`.
    pub fn new(transport: DynTransport) -> Self { Self { transport } }

    /// Fetch every reference and attach its trimmed code.
    ///
    /// Waits for every fetch to settle. If any failed, the first failure in
    /// declared order is returned and nothing is loaded.
    pub async fn load(&self, references: Vec<PipeModuleReference>) -> Result<Vec<PipeModule>> {
        if references.is_empty() {
            return Ok(Vec::new());
        }

        logging::trace(
            "LOADER",
            &format!("fetching {} pipe-module(s) via {}", references.len(), self.transport.name()),
        );
        let settled =
            join_all(references.iter().map(|r| self.transport.fetch(&r.source))).await;

        let mut modules = Vec::with_capacity(references.len());
        for (reference, outcome) in references.into_iter().zip(settled) {
            match outcome {
                Ok(body) => {
                    tracing::debug!(name = %reference.name, bytes = body.len(), "pipe-module loaded");
                    let code = body.trim().to_string();
                    modules.push(reference.with_code(code));
                }
                Err(err) => {
                    tracing::error!("failed to load pipe-module '{}': {}", reference.name, err);
                    return Err(PipelineError::PipeModuleFetch {
                        name: reference.name,
                        location: reference.source,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(modules)
    }
}

impl std::fmt::Debug for PipeModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeModuleLoader").field("transport", &self.transport.name()).finish()
    }
}
