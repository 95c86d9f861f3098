//! Synchronized emission of the three artifacts.
//!
//! [`MultiArtifactEmitter`] owns the three writers and the name registry
//! they share, and is the only component that calls them. Within one
//! `(path, method)` pair it always emits the pipe-modules first, then the
//! query, then the route, so a route fragment is never written before the
//! names it references have been committed.

use std::fmt;
use std::sync::Arc;

use analysis::{extract_pipe_module_references, extract_query, extract_route};
use codegen::{
    ArtifactSink, ArtifactWriter, PipeModuleWriter, QueryWriter, RouteBinding, RouteWriter,
};
use ir::{DataSource, OperationNode, Specification};
use registry::{NameKind, NameRegistry};
use transport::DynTransport;

use crate::loader::PipeModuleLoader;
use crate::{PipelineError, Result};

/// Lifecycle of an emitter.
///
/// `Idle → Prewriting → Emitting → Postwriting → Done`; there is no way
/// back, so a second run needs a fresh emitter and a fresh sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    /// Nothing written yet
    Idle,
    /// Writing headers
    Prewriting,
    /// Accepting `(path, method)` pairs
    Emitting,
    /// Writing export sections
    Postwriting,
    /// Sealed; no further writes
    Done,
}

impl fmt::Display for EmitterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmitterState::Idle => "idle",
            EmitterState::Prewriting => "prewriting",
            EmitterState::Emitting => "emitting",
            EmitterState::Postwriting => "postwriting",
            EmitterState::Done => "done",
        })
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Route handlers emitted
    pub routes: usize,
    /// Query definitions emitted
    pub queries: usize,
    /// Distinct pipe-modules emitted
    pub pipe_modules: usize,
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} route(s), {} query definition(s), {} pipe-module(s)",
            self.routes, self.queries, self.pipe_modules
        )
    }
}

/// State machine driving the query, pipe-module and route writers.
pub struct MultiArtifactEmitter {
    state: EmitterState,
    registry: Arc<NameRegistry>,
    loader: PipeModuleLoader,
    pipes: PipeModuleWriter,
    queries: QueryWriter,
    routes: RouteWriter,
}

impl MultiArtifactEmitter {
    /// Emitter writing to `sink` and fetching pipe-modules through `transport`.
    ///
    /// Every artifact must already exist in the sink.
    pub fn new(
        sink: Arc<dyn ArtifactSink>,
        transport: DynTransport,
        data_sources: Vec<DataSource>,
    ) -> Self {
        let registry = Arc::new(NameRegistry::new());
        Self {
            state: EmitterState::Idle,
            loader: PipeModuleLoader::new(transport),
            pipes: PipeModuleWriter::new(sink.clone(), registry.clone()),
            queries: QueryWriter::new(sink.clone(), registry.clone(), data_sources),
            routes: RouteWriter::new(sink, registry.clone()),
            registry,
        }
    }

    /// Current state.
    pub fn state(&self) -> EmitterState { self.state }

    /// Names committed so far.
    pub fn registry(&self) -> &NameRegistry { &self.registry }

    fn expect_state(&self, expected: EmitterState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PipelineError::InvalidState { operation, state: self.state })
        }
    }

    fn transition(&mut self, next: EmitterState) {
        tracing::debug!("emitter {} -> {}", self.state, next);
        self.state = next;
    }

    /// Write every artifact's header.
    pub fn begin(&mut self) -> Result<()> {
        self.expect_state(EmitterState::Idle, "begin")?;
        self.transition(EmitterState::Prewriting);
        self.pipes.begin()?;
        self.queries.begin()?;
        self.routes.begin()?;
        self.transition(EmitterState::Emitting);
        Ok(())
    }

    /// Process one `(path, method)` pair.
    pub async fn emit_pair(&mut self, op: &OperationNode) -> Result<()> {
        self.expect_state(EmitterState::Emitting, "emit")?;

        let route = extract_route(op)?;
        let query = extract_query(op)?;
        let references = extract_pipe_module_references(op)?;
        let modules = self.loader.load(references).await?;

        self.pipes.emit(&modules)?;
        self.queries.emit(&query)?;

        let query_name = self
            .queries
            .last_emitted()
            .ok_or_else(|| PipelineError::Message(format!("no query emitted for {}", route)))?
            .to_string();
        let binding =
            RouteBinding { route, query_name, pipe_names: self.pipes.current_names().to_vec() };
        self.routes.emit(&binding)?;

        tracing::debug!(
            "emitted {} -> {} ({} pipe-module(s))",
            binding.route,
            binding.query_name,
            binding.pipe_names.len()
        );
        Ok(())
    }

    /// Write every artifact's export section and seal the run.
    pub fn finish(&mut self) -> Result<CompileReport> {
        self.expect_state(EmitterState::Emitting, "finish")?;
        self.transition(EmitterState::Postwriting);
        self.pipes.end()?;
        self.queries.end()?;
        self.routes.end()?;
        self.transition(EmitterState::Done);
        Ok(self.report())
    }

    /// Counts of what has been emitted so far.
    pub fn report(&self) -> CompileReport {
        CompileReport {
            routes: self.routes.routes().len(),
            queries: self.registry.count(NameKind::Query),
            pipe_modules: self.registry.count(NameKind::PipeModule),
        }
    }

    /// Emit every pair of `spec`, in declaration order, between `begin` and `finish`.
    pub async fn run(&mut self, spec: &Specification) -> Result<CompileReport> {
        self.begin()?;
        for op in spec.operations() {
            self.emit_pair(op).await?;
        }
        self.finish()
    }
}

impl fmt::Debug for MultiArtifactEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiArtifactEmitter")
            .field("state", &self.state)
            .field("report", &self.report())
            .finish()
    }
}
