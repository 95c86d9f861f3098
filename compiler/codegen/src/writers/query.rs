//! Writer for the query-execution artifact (`executeQuery.js`).

use std::sync::Arc;

use ir::{DataSource, Query};
use registry::{NameKind, NameRegistry};

use super::{export_list, ArtifactBuffer, ArtifactWriter, WriterPhase};
use crate::sink::{ArtifactKind, ArtifactSink};
use crate::template::{render, Slot};
use crate::Result;

const HEADER: &str = r#"const { Client } = require('graphql-ld');
const { QueryEngineComunica } = require('graphql-ld-comunica');

const comunicaConfig = {
  sources: {{0}},
};

async function executeQuery(definition, variables) {
  const client = new Client({
    context: definition.context,
    queryEngine: new QueryEngineComunica(comunicaConfig),
  });
  const { data } = await client.query({ query: definition.query, variables });
  return data;
}

"#;

const DEFINITION: &str = r#"const {{0}} = {
  query: {{1}},
  context: {{2}},
};

"#;

const EXPORTS: &str = "module.exports = { {{0}} };\n";

/// Emits one definition per [`Query`] plus the `executeQuery` entry point.
pub struct QueryWriter {
    buffer: ArtifactBuffer,
    registry: Arc<NameRegistry>,
    data_sources: Vec<DataSource>,
    last_emitted: Option<String>,
}

impl QueryWriter {
    /// Writer configured with the engine's ordered data sources.
    pub fn new(
        sink: Arc<dyn ArtifactSink>,
        registry: Arc<NameRegistry>,
        data_sources: Vec<DataSource>,
    ) -> Self {
        Self {
            buffer: ArtifactBuffer::new(ArtifactKind::Query, sink),
            registry,
            data_sources,
            last_emitted: None,
        }
    }

    /// Name of the most recently emitted query.
    pub fn last_emitted(&self) -> Option<&str> { self.last_emitted.as_deref() }
}

impl ArtifactWriter for QueryWriter {
    type Entity = Query;

    fn kind(&self) -> ArtifactKind { self.buffer.kind() }

    fn phase(&self) -> WriterPhase { self.buffer.phase() }

    fn begin(&mut self) -> Result<()> {
        self.buffer.open()?;
        let sources = serde_json::to_value(&self.data_sources)?;
        self.buffer.push(&render(HEADER, &[Slot::Json(&sources)])?);
        self.buffer.flush()
    }

    fn emit(&mut self, query: &Query) -> Result<()> {
        self.buffer.ensure_open("emit")?;
        let fragment = render(
            DEFINITION,
            &[Slot::Ident(&query.name), Slot::Str(&query.query), Slot::Json(&query.context)],
        )?;
        self.registry.register(NameKind::Query, &query.name)?;
        self.last_emitted = Some(query.name.clone());
        self.buffer.push(&fragment);
        self.buffer.flush()
    }

    fn end(&mut self) -> Result<()> {
        self.buffer.ensure_open("end")?;
        let mut names = vec!["executeQuery".to_string()];
        names.extend(self.registry.names_for(NameKind::Query));
        self.buffer.push(&render(EXPORTS, &[Slot::Raw(&export_list(&names)?)])?);
        self.buffer.seal()
    }
}

impl std::fmt::Debug for QueryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryWriter")
            .field("phase", &self.buffer.phase())
            .field("data_sources", &self.data_sources)
            .field("last_emitted", &self.last_emitted)
            .finish()
    }
}
