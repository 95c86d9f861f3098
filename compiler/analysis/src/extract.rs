//! Entity extractors.
//!
//! Each extractor takes one slice of a resolved specification and returns a
//! typed entity. They are pure, so they can run in any order and may be
//! re-run on the same input with the same result.

use std::str::FromStr;

use codegen::{is_identifier, is_module_binding};
use ir::{
    kind_of, DataSource, HttpMethod, OperationNode, PipeModuleReference, Query, Route,
};
use registry::{DuplicateNameError, NameKind};
use serde_json::Value as Json;
use serde_yaml::Value;

use crate::normalizer::{collapse_whitespace, derive_query_name, normalize_path};
use crate::{ExtractError, Result};

/// Key of the query block inside an operation.
pub const QUERY_KEY: &str = "query";
/// Key of the query text inside the query block.
pub const GRAPHQL_QUERY_KEY: &str = "graphql-query";
/// Key of the JSON-LD context inside the query block.
pub const CONTEXT_KEY: &str = "json-ld-context";
/// Key of the post-processing chain inside an operation.
pub const POSTPROCESSING_KEY: &str = "postprocessing";
/// Key of a pipe-module's source URI.
pub const SOURCE_KEY: &str = "source";
/// Key of a pipe-module's name in the sequence form.
pub const NAME_KEY: &str = "name";

/// Every entity derived from one `(path, method)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedOperation {
    /// Normalized route
    pub route: Route,
    /// Query with its derived name
    pub query: Query,
    /// Post-processing chain in declared order
    pub pipes: Vec<PipeModuleReference>,
}

/// Flatten `type -> [locations]` into an ordered list.
///
/// A single string is accepted in place of a one-element list.
pub fn extract_data_sources(node: &Value) -> Result<Vec<DataSource>> {
    let map = match node {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(map) => map,
        other => {
            return Err(ExtractError::MalformedDataSources(format!(
                "expected a mapping of type to locations, found {}",
                kind_of(other)
            )))
        }
    };

    let mut sources = Vec::new();
    for (source_type, locations) in map {
        let source_type = source_type.as_str().ok_or_else(|| {
            ExtractError::MalformedDataSources(format!(
                "data-source types must be strings, found {}",
                kind_of(source_type)
            ))
        })?;
        match locations {
            Value::String(location) => sources.push(DataSource::new(source_type, location)),
            Value::Sequence(items) => {
                for item in items {
                    let location = item.as_str().ok_or_else(|| {
                        ExtractError::MalformedDataSources(format!(
                            "'{}' locations must be strings, found {}",
                            source_type,
                            kind_of(item)
                        ))
                    })?;
                    sources.push(DataSource::new(source_type, location));
                }
            }
            Value::Null => {}
            other => {
                return Err(ExtractError::MalformedDataSources(format!(
                    "'{}' must list locations, found {}",
                    source_type,
                    kind_of(other)
                )))
            }
        }
    }
    Ok(sources)
}

/// Validate the verb and normalize the path of one operation.
pub fn extract_route(op: &OperationNode) -> Result<Route> {
    let method = HttpMethod::from_str(&op.method).map_err(|_| {
        ExtractError::InvalidRoutingMethod { method: op.method.clone(), path: op.path.clone() }
    })?;
    Ok(Route { method, path: normalize_path(&op.path) })
}

/// Build the [`Query`] of one operation.
pub fn extract_query(op: &OperationNode) -> Result<Query> {
    let route = extract_route(op)?;
    let block = match op.node.get(QUERY_KEY) {
        Some(block @ Value::Mapping(_)) => block,
        Some(other) => {
            return Err(malformed(op, format!("'{}' must be a mapping, found {}", QUERY_KEY, kind_of(other))))
        }
        None => return Err(malformed(op, format!("missing '{}' block", QUERY_KEY))),
    };

    let text = match block.get(GRAPHQL_QUERY_KEY) {
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(malformed(
                op,
                format!("'{}' must be a string, found {}", GRAPHQL_QUERY_KEY, kind_of(other)),
            ))
        }
        None => return Err(malformed(op, format!("missing '{}'", GRAPHQL_QUERY_KEY))),
    };

    let context = match block.get(CONTEXT_KEY) {
        None | Some(Value::Null) => Json::Object(Default::default()),
        Some(Value::String(raw)) => serde_json::from_str(raw)
            .map_err(|e| invalid_context(op, format!("not valid JSON: {}", e)))?,
        Some(mapping @ Value::Mapping(_)) => serde_json::to_value(mapping)
            .map_err(|e| invalid_context(op, e.to_string()))?,
        Some(other) => {
            return Err(invalid_context(
                op,
                format!("expected a JSON string or a mapping, found {}", kind_of(other)),
            ))
        }
    };

    let name = derive_query_name(route.method, &op.path);
    if !is_identifier(&name) {
        return Err(ExtractError::InvalidIdentifier {
            name,
            method: op.method.clone(),
            path: op.path.clone(),
        });
    }

    Ok(Query { name, query: collapse_whitespace(text), context })
}

/// The post-processing chain of one operation, in declared order.
///
/// Accepted forms: a mapping `name -> { source }` (or `name -> "uri"`), a
/// sequence of `{ name, source }` entries, or nothing at all.
pub fn extract_pipe_module_references(op: &OperationNode) -> Result<Vec<PipeModuleReference>> {
    let mut refs: Vec<PipeModuleReference> = Vec::new();
    match op.node.get(POSTPROCESSING_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(entries)) => {
            for (name, entry) in entries {
                let name = name.as_str().ok_or_else(|| {
                    malformed(op, format!("pipe-module names must be strings, found {}", kind_of(name)))
                })?;
                let source = match entry {
                    Value::String(source) => source.as_str(),
                    _ => required_str(op, entry, SOURCE_KEY, name)?,
                };
                refs.push(PipeModuleReference::new(name, source));
            }
        }
        Some(Value::Sequence(entries)) => {
            for (index, entry) in entries.iter().enumerate() {
                let label = format!("entry {}", index);
                let name = required_str(op, entry, NAME_KEY, &label)?;
                let source = required_str(op, entry, SOURCE_KEY, name)?;
                if refs.iter().any(|r| r.name == name) {
                    return Err(DuplicateNameError::new(NameKind::PipeModule, name)
                        .with_context(format!("declared twice by {} {}", op.method, op.path))
                        .into());
                }
                refs.push(PipeModuleReference::new(name, source));
            }
        }
        Some(other) => {
            return Err(malformed(
                op,
                format!("'{}' must be a mapping or a sequence, found {}", POSTPROCESSING_KEY, kind_of(other)),
            ))
        }
    }

    for reference in &refs {
        if !is_identifier(&reference.name) || is_module_binding(&reference.name) {
            return Err(ExtractError::InvalidIdentifier {
                name: reference.name.clone(),
                method: op.method.clone(),
                path: op.path.clone(),
            });
        }
    }
    Ok(refs)
}

/// Run every per-operation extractor.
pub fn extract_operation(op: &OperationNode) -> Result<ExtractedOperation> {
    Ok(ExtractedOperation {
        route: extract_route(op)?,
        query: extract_query(op)?,
        pipes: extract_pipe_module_references(op)?,
    })
}

fn required_str<'a>(op: &OperationNode, entry: &'a Value, key: &str, label: &str) -> Result<&'a str> {
    match entry.get(key) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(malformed(
            op,
            format!("pipe-module {} '{}' must be a string, found {}", label, key, kind_of(other)),
        )),
        None => Err(malformed(op, format!("pipe-module {} has no '{}'", label, key))),
    }
}

fn malformed(op: &OperationNode, reason: String) -> ExtractError {
    ExtractError::MalformedOperation { method: op.method.clone(), path: op.path.clone(), reason }
}

fn invalid_context(op: &OperationNode, reason: String) -> ExtractError {
    ExtractError::InvalidContext { method: op.method.clone(), path: op.path.clone(), reason }
}
