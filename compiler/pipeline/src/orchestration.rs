//! Pipeline orchestration for the main entry points.
//!
//! A run resolves the specification, validates it, creates the three
//! artifacts and only then starts emitting. Failures before emission leave
//! the sink untouched; failures during emission leave whatever was already
//! flushed.

use std::sync::Arc;

use analysis::extract_data_sources;
use codegen::{ArtifactKind, ArtifactSink};
use ir::Specification;
use resolver::SpecificationResolver;
use transport::DynTransport;

use crate::emitter::{CompileReport, MultiArtifactEmitter};
use crate::Result;

/// Compile the specification at `spec_location` into `sink`.
///
/// # Arguments
///
/// * `spec_location` - path, `file://` URI or URL of the root YAML document
/// * `sink` - destination of the three artifacts
/// * `transport` - used for remote `$ref` targets and pipe-module sources
pub async fn compile(
    spec_location: &str,
    sink: Arc<dyn ArtifactSink>,
    transport: DynTransport,
) -> Result<CompileReport> {
    let resolver = SpecificationResolver::new(transport.clone());
    let spec = resolver.resolve(spec_location).await?;
    tracing::info!("resolved {} with {} operation(s)", spec_location, spec.operation_count());
    compile_specification(&spec, sink, transport).await
}

/// Compile an already resolved specification into `sink`.
pub async fn compile_specification(
    spec: &Specification,
    sink: Arc<dyn ArtifactSink>,
    transport: DynTransport,
) -> Result<CompileReport> {
    let summary = analysis::validate(spec)?;
    logging::trace(
        "PIPELINE",
        &format!(
            "validated {} operation(s), {} data source(s), {} pipe-module(s)",
            summary.operations, summary.data_sources, summary.pipe_modules
        ),
    );

    let data_sources = extract_data_sources(spec.datasources())?;
    for kind in ArtifactKind::ALL {
        sink.create(kind)?;
    }

    let mut emitter = MultiArtifactEmitter::new(sink, transport, data_sources);
    let report = emitter.run(spec).await?;
    tracing::info!("compiled {}", report);
    Ok(report)
}
