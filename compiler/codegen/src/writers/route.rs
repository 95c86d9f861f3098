//! Writer for the routing artifact (`routes.js`).

use std::sync::Arc;

use ir::Route;
use registry::{NameKind, NameRegistry};

use super::{ArtifactBuffer, ArtifactWriter, WriterPhase};
use crate::sink::{ArtifactKind, ArtifactSink};
use crate::template::{render, Slot};
use crate::{CodegenError, Result};

const HEADER: &str = r#"const express = require('express');
const queries = require('./executeQuery');
const pipeModules = require('./pipeModules');

const router = express.Router();

"#;

const HANDLER: &str = r#"router.{{0}}({{1}}, async (req, res, next) => {
  try {
    const variables = { ...req.query, ...req.params };
    let data = await queries.executeQuery(queries.{{2}}, variables);
{{3}}    res.json(data);
  } catch (err) {
    next(err);
  }
});

"#;

const PIPE_CALL: &str = "    data = await pipeModules.{{0}}(data);\n";

const EXPORTS: &str = "module.exports = router;\nmodule.exports.routes = {{0}};\n";

/// Everything the routing artifact needs to wire one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    /// Verb and normalized path
    pub route: Route,
    /// Name of the query definition to execute
    pub query_name: String,
    /// Pipe-modules applied to the result, in declared order
    pub pipe_names: Vec<String>,
}

/// Emits one express handler per [`RouteBinding`].
pub struct RouteWriter {
    buffer: ArtifactBuffer,
    registry: Arc<NameRegistry>,
    routes: Vec<Route>,
}

impl RouteWriter {
    /// New writer reading committed names from `registry`.
    pub fn new(sink: Arc<dyn ArtifactSink>, registry: Arc<NameRegistry>) -> Self {
        Self {
            buffer: ArtifactBuffer::new(ArtifactKind::Routes, sink),
            registry,
            routes: Vec::new(),
        }
    }

    /// Routes emitted so far.
    pub fn routes(&self) -> &[Route] { &self.routes }

    fn check_committed(&self, binding: &RouteBinding) -> Result<()> {
        let wanted = std::iter::once((NameKind::Query, &binding.query_name))
            .chain(binding.pipe_names.iter().map(|name| (NameKind::PipeModule, name)));
        for (kind, name) in wanted {
            if !self.registry.contains(kind, name) {
                return Err(CodegenError::DanglingReference {
                    route: binding.route.to_string(),
                    kind,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl ArtifactWriter for RouteWriter {
    type Entity = RouteBinding;

    fn kind(&self) -> ArtifactKind { self.buffer.kind() }

    fn phase(&self) -> WriterPhase { self.buffer.phase() }

    fn begin(&mut self) -> Result<()> {
        self.buffer.open()?;
        self.buffer.push(HEADER);
        self.buffer.flush()
    }

    fn emit(&mut self, binding: &RouteBinding) -> Result<()> {
        self.buffer.ensure_open("emit")?;
        self.check_committed(binding)?;

        let mut calls = String::new();
        for name in &binding.pipe_names {
            calls.push_str(&render(PIPE_CALL, &[Slot::Ident(name)])?);
        }
        let fragment = render(
            HANDLER,
            &[
                Slot::Raw(binding.route.method.as_str()),
                Slot::Str(&binding.route.path),
                Slot::Ident(&binding.query_name),
                Slot::Raw(&calls),
            ],
        )?;

        self.routes.push(binding.route.clone());
        self.buffer.push(&fragment);
        self.buffer.flush()
    }

    fn end(&mut self) -> Result<()> {
        self.buffer.ensure_open("end")?;
        let routes = serde_json::to_value(&self.routes)?;
        self.buffer.push(&render(EXPORTS, &[Slot::Json(&routes)])?);
        self.buffer.seal()
    }
}

impl std::fmt::Debug for RouteWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteWriter")
            .field("phase", &self.buffer.phase())
            .field("routes", &self.routes)
            .finish()
    }
}
