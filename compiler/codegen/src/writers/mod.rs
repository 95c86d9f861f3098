//! Artifact writers.
//!
//! Each writer owns one artifact and follows the same protocol: `begin`
//! writes the header, `emit` writes one entity's fragment, `end` writes the
//! closing export section. The buffer is flushed to the sink after every
//! call, so at most one fragment is held in memory.

mod pipe;
mod query;
mod route;

use std::fmt;
use std::sync::Arc;

pub use pipe::PipeModuleWriter;
pub use query::QueryWriter;
pub use route::{RouteBinding, RouteWriter};

use crate::sink::{ArtifactKind, ArtifactSink};
use crate::template::{is_identifier, TemplateError};
use crate::{CodegenError, Result};

/// Lifecycle of a single writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterPhase {
    /// Constructed, header not yet written
    Fresh,
    /// Header written, accepting entities
    Open,
    /// Export section written; no further writes
    Sealed,
}

impl fmt::Display for WriterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriterPhase::Fresh => "fresh",
            WriterPhase::Open => "open",
            WriterPhase::Sealed => "sealed",
        })
    }
}

/// The `begin` / `emit` / `end` protocol shared by all writers.
pub trait ArtifactWriter {
    /// What one `emit` call consumes.
    type Entity: ?Sized;

    /// Artifact this writer owns.
    fn kind(&self) -> ArtifactKind;

    /// Current lifecycle phase.
    fn phase(&self) -> WriterPhase;

    /// Write the fixed header.
    fn begin(&mut self) -> Result<()>;

    /// Write the fragment for one entity.
    fn emit(&mut self, entity: &Self::Entity) -> Result<()>;

    /// Write the closing export section and seal the artifact.
    fn end(&mut self) -> Result<()>;
}

/// Buffer-then-flush state shared by the concrete writers.
pub(crate) struct ArtifactBuffer {
    kind: ArtifactKind,
    sink: Arc<dyn ArtifactSink>,
    buffer: String,
    phase: WriterPhase,
}

impl ArtifactBuffer {
    pub(crate) fn new(kind: ArtifactKind, sink: Arc<dyn ArtifactSink>) -> Self {
        Self { kind, sink, buffer: String::new(), phase: WriterPhase::Fresh }
    }

    pub(crate) fn kind(&self) -> ArtifactKind { self.kind }

    pub(crate) fn phase(&self) -> WriterPhase { self.phase }

    fn expect_phase(&self, expected: WriterPhase, operation: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CodegenError::Phase {
                artifact: self.kind.file_name(),
                operation,
                phase: self.phase,
            })
        }
    }

    /// Move from `Fresh` to `Open`.
    pub(crate) fn open(&mut self) -> Result<()> {
        self.expect_phase(WriterPhase::Fresh, "begin")?;
        self.phase = WriterPhase::Open;
        Ok(())
    }

    pub(crate) fn ensure_open(&self, operation: &'static str) -> Result<()> {
        self.expect_phase(WriterPhase::Open, operation)
    }

    pub(crate) fn push(&mut self, text: &str) { self.buffer.push_str(text); }

    /// Append the buffered text to the sink and clear the buffer.
    pub(crate) fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.sink.append(self.kind, &self.buffer)?;
        tracing::trace!(artifact = %self.kind, bytes = self.buffer.len(), "flushed");
        self.buffer.clear();
        Ok(())
    }

    /// Flush and move from `Open` to `Sealed`.
    pub(crate) fn seal(&mut self) -> Result<()> {
        self.ensure_open("end")?;
        self.flush()?;
        self.phase = WriterPhase::Sealed;
        Ok(())
    }
}

/// Comma-separated export list, each entry checked against the identifier grammar.
pub(crate) fn export_list<S: AsRef<str>>(names: &[S]) -> Result<String> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if !is_identifier(name) {
            return Err(TemplateError::InvalidIdentifier(name.to_string()).into());
        }
        out.push(name);
    }
    Ok(out.join(", "))
}
