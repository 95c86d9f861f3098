//! The resolved specification tree.
//!
//! A [`Specification`] is built once from a fully resolved YAML tree (every
//! `$ref` already replaced) and is immutable afterwards. It only checks the
//! top-level shape; per-operation validation is left to the entity
//! extractors so that errors can name the `(method, path)` coordinate.

use serde_yaml::{Mapping, Value};

/// Top-level key holding `type -> [locations]`.
pub const DATASOURCES_KEY: &str = "datasources";
/// Top-level key holding `path -> method -> operation`.
pub const PATHS_KEY: &str = "paths";

/// Errors raised when a resolved tree does not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum SpecificationError {
    /// The tree is structurally invalid
    #[error("Malformed specification: {0}")]
    Malformed(String),
    /// The document is not valid YAML
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// One `(path, method)` coordinate together with its raw operation node.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationNode {
    /// Path exactly as declared (e.g. `/movies/{actor}`)
    pub path: String,
    /// Method key exactly as declared; not yet validated
    pub method: String,
    /// Raw operation descriptor
    pub node: Value,
}

/// A fully resolved specification.
#[derive(Debug, Clone)]
pub struct Specification {
    datasources: Value,
    operations: Vec<OperationNode>,
}

impl Specification {
    /// Build a specification from a resolved YAML tree.
    ///
    /// Operations are kept in declaration order: paths first, then methods
    /// within a path. That order becomes the declaration order of every
    /// generated artifact.
    pub fn from_value(root: Value) -> Result<Self, SpecificationError> {
        let root = match root {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(SpecificationError::Malformed(format!(
                    "root must be a mapping, found {}",
                    kind_of(&other)
                )))
            }
        };

        let datasources = root.get(DATASOURCES_KEY).cloned().unwrap_or(Value::Null);

        let mut operations = Vec::new();
        match root.get(PATHS_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::Mapping(paths)) => {
                for (path, item) in paths {
                    let path = key_str(path, "path")?;
                    collect_operations(path, item, &mut operations)?;
                }
            }
            Some(other) => {
                return Err(SpecificationError::Malformed(format!(
                    "'{}' must be a mapping, found {}",
                    PATHS_KEY,
                    kind_of(other)
                )))
            }
        }

        Ok(Self { datasources, operations })
    }

    /// Parse and build a specification from YAML text that contains no references.
    pub fn from_yaml_str(text: &str) -> Result<Self, SpecificationError> {
        let root: Value = serde_yaml::from_str(text)?;
        Self::from_value(root)
    }

    /// Raw `datasources` node (`Null` when absent).
    pub fn datasources(&self) -> &Value { &self.datasources }

    /// Every `(path, method)` coordinate in declaration order.
    pub fn operations(&self) -> &[OperationNode] { &self.operations }

    /// Number of `(path, method)` pairs.
    pub fn operation_count(&self) -> usize { self.operations.len() }
}

fn collect_operations(
    path: &str,
    item: &Value,
    out: &mut Vec<OperationNode>,
) -> Result<(), SpecificationError> {
    match item {
        Value::Null => Ok(()),
        Value::Mapping(methods) => {
            for (method, node) in methods {
                let method = key_str(method, "method")?;
                out.push(OperationNode {
                    path: path.to_string(),
                    method: method.to_string(),
                    node: node.clone(),
                });
            }
            Ok(())
        }
        other => Err(SpecificationError::Malformed(format!(
            "path '{}' must map methods to operations, found {}",
            path,
            kind_of(other)
        ))),
    }
}

fn key_str<'a>(key: &'a Value, what: &str) -> Result<&'a str, SpecificationError> {
    key.as_str().ok_or_else(|| {
        SpecificationError::Malformed(format!("{} keys must be strings, found {}", what, kind_of(key)))
    })
}

/// Short name of a YAML node kind, for error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
