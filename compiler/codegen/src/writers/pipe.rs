//! Writer for the pipe-module artifact (`pipeModules.js`).

use std::collections::BTreeMap;
use std::sync::Arc;

use ir::PipeModule;
use registry::{DuplicateNameError, NameKind, NameRegistry};

use super::{export_list, ArtifactBuffer, ArtifactWriter, WriterPhase};
use crate::sink::{ArtifactKind, ArtifactSink};
use crate::template::{render, Slot};
use crate::Result;

const HEADER: &str = "'use strict';\n\n";

const DEFINITION: &str = "// source: {{0}}\nconst {{1}} = {{2}};\n\n";

const EXPORTS: &str = "module.exports = { {{0}} };\n";

const EMPTY_EXPORTS: &str = "module.exports = {};\n";

/// Emits the loaded post-processing chain of one route per `emit` call.
///
/// A module already emitted for an earlier route is referenced again without
/// a second definition, provided it comes from the same source.
pub struct PipeModuleWriter {
    buffer: ArtifactBuffer,
    registry: Arc<NameRegistry>,
    sources: BTreeMap<String, String>,
    current: Vec<String>,
}

impl PipeModuleWriter {
    /// New writer sharing `registry` with the other writers.
    pub fn new(sink: Arc<dyn ArtifactSink>, registry: Arc<NameRegistry>) -> Self {
        Self {
            buffer: ArtifactBuffer::new(ArtifactKind::PipeModules, sink),
            registry,
            sources: BTreeMap::new(),
            current: Vec::new(),
        }
    }

    /// Names of the chain passed to the last `emit`, in declared order.
    pub fn current_names(&self) -> &[String] { &self.current }
}

impl ArtifactWriter for PipeModuleWriter {
    type Entity = [PipeModule];

    fn kind(&self) -> ArtifactKind { self.buffer.kind() }

    fn phase(&self) -> WriterPhase { self.buffer.phase() }

    fn begin(&mut self) -> Result<()> {
        self.buffer.open()?;
        self.buffer.push(HEADER);
        self.buffer.flush()
    }

    fn emit(&mut self, modules: &[PipeModule]) -> Result<()> {
        self.buffer.ensure_open("emit")?;
        self.current.clear();

        let mut chain: Vec<&str> = Vec::with_capacity(modules.len());
        let mut fresh = Vec::new();
        for module in modules {
            if chain.contains(&module.name.as_str()) {
                return Err(DuplicateNameError::new(NameKind::PipeModule, &module.name)
                    .with_context("declared twice in one post-processing chain")
                    .into());
            }
            chain.push(&module.name);

            match self.sources.get(&module.name) {
                Some(source) if *source == module.source => {}
                Some(source) => {
                    return Err(DuplicateNameError::new(NameKind::PipeModule, &module.name)
                        .with_context(format!("sources {} and {}", source, module.source))
                        .into());
                }
                None => fresh.push(module),
            }
        }

        for module in fresh {
            let fragment = render(
                DEFINITION,
                &[Slot::Str(&module.source), Slot::Ident(&module.name), Slot::Raw(&module.code)],
            )?;
            self.registry.register(NameKind::PipeModule, &module.name)?;
            self.sources.insert(module.name.clone(), module.source.clone());
            self.buffer.push(&fragment);
        }
        self.current = chain.into_iter().map(str::to_string).collect();
        self.buffer.flush()
    }

    fn end(&mut self) -> Result<()> {
        self.buffer.ensure_open("end")?;
        let names = self.registry.names_for(NameKind::PipeModule);
        if names.is_empty() {
            self.buffer.push(EMPTY_EXPORTS);
        } else {
            self.buffer.push(&render(EXPORTS, &[Slot::Raw(&export_list(&names)?)])?);
        }
        self.buffer.seal()
    }
}

impl std::fmt::Debug for PipeModuleWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeModuleWriter")
            .field("phase", &self.buffer.phase())
            .field("current", &self.current)
            .finish()
    }
}
