//! Specification validation
//!
//! Runs every extractor over a whole specification before anything is
//! written, so that a bad verb or a name collision produces no output.

use std::collections::HashMap;

use ir::Specification;
use registry::{DuplicateNameError, NameKind};

use crate::extract::{extract_data_sources, extract_operation};
use crate::Result;

/// Counts gathered while validating a specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Declared data sources
    pub data_sources: usize,
    /// `(path, method)` pairs, one route and one query each
    pub operations: usize,
    /// Distinct pipe-modules across all routes
    pub pipe_modules: usize,
}

/// Specification validator
#[derive(Debug, Default)]
pub struct SpecValidator;

impl SpecValidator {
    /// Create a new validator
    pub fn new() -> Self { Self }

    /// Extract every entity and check cross-operation constraints.
    ///
    /// Fails on the first problem in declaration order:
    /// - any extraction error (bad verb, malformed operation, bad context)
    /// - two operations deriving the same query name
    /// - one pipe-module name bound to two different sources
    pub fn validate(&self, spec: &Specification) -> Result<ValidationSummary> {
        let data_sources = extract_data_sources(spec.datasources())?;

        let mut queries: HashMap<String, String> = HashMap::new();
        let mut pipes: HashMap<String, String> = HashMap::new();
        for op in spec.operations() {
            let extracted = extract_operation(op)?;
            let declared = format!("{} {}", op.method, op.path);

            if let Some(previous) = queries.get(&extracted.query.name) {
                return Err(DuplicateNameError::new(NameKind::Query, &extracted.query.name)
                    .with_context(format!("{} and {}", previous, declared))
                    .into());
            }
            queries.insert(extracted.query.name.clone(), declared);

            for pipe in &extracted.pipes {
                match pipes.get(&pipe.name) {
                    Some(source) if *source != pipe.source => {
                        return Err(DuplicateNameError::new(NameKind::PipeModule, &pipe.name)
                            .with_context(format!("sources {} and {}", source, pipe.source))
                            .into());
                    }
                    Some(_) => {}
                    None => {
                        pipes.insert(pipe.name.clone(), pipe.source.clone());
                    }
                }
            }
        }

        let summary = ValidationSummary {
            data_sources: data_sources.len(),
            operations: spec.operation_count(),
            pipe_modules: pipes.len(),
        };
        tracing::debug!(?summary, "specification validated");
        Ok(summary)
    }
}

/// Validate `spec` with a default [`SpecValidator`].
pub fn validate(spec: &Specification) -> Result<ValidationSummary> { SpecValidator::new().validate(spec) }
