#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Specification Resolution
//!
//! Loads a YAML specification and replaces every `{ $ref: <location> }`
//! mapping with the parsed contents of its target, recursively. Targets may
//! be local files (relative to the referencing document) or remote URLs
//! fetched through a [`transport::Transport`], optionally narrowed with a
//! `#/json/pointer` fragment.
//!
//! Resolution is all-or-nothing: every reference is attempted, and if any
//! of them could not be dereferenced the call fails with
//! [`ResolveError::UnresolvedReference`] for the first such reference in
//! document order.

pub mod location;
pub mod pointer;

use std::collections::HashMap;
use std::path::Path;

use futures::future::BoxFuture;
use ir::{Specification, SpecificationError};
use serde_yaml::{Mapping, Value};
use transport::DynTransport;

pub use crate::location::Location;
use crate::location::split_fragment;

/// Key marking a reference mapping.
pub const REF_KEY: &str = "$ref";

/// Errors that can occur while resolving a specification
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A declared reference could not be dereferenced
    #[error("unresolved reference '{location}' in {document}: {reason}")]
    UnresolvedReference {
        /// The reference exactly as written
        location: String,
        /// Document containing the reference
        document: String,
        /// Why dereferencing failed
        reason: String,
    },
    /// The root document itself could not be loaded or parsed
    #[error("cannot load specification {location}: {reason}")]
    Root {
        /// Root location
        location: String,
        /// Why loading failed
        reason: String,
    },
    /// The resolved tree is not a valid specification
    #[error(transparent)]
    Specification(#[from] SpecificationError),
}

/// Result alias for resolver operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// A parsed document and the location references inside it are relative to.
struct Document {
    location: Location,
    root: Value,
}

/// Mutable bookkeeping for one resolution run.
#[derive(Default)]
struct Walk {
    /// Parsed documents (or load failures) by location
    cache: HashMap<String, std::result::Result<Value, String>>,
    /// Every reference that failed, in document order
    failures: Vec<ResolveError>,
    /// References currently being expanded, for cycle detection
    stack: Vec<String>,
    /// Number of references attempted
    attempted: usize,
}

impl Walk {
    fn fail(&mut self, reference: &str, doc: &Document, reason: impl Into<String>) -> Value {
        self.failures.push(ResolveError::UnresolvedReference {
            location: reference.to_string(),
            document: doc.location.to_string(),
            reason: reason.into(),
        });
        Value::Null
    }
}

/// Resolves specifications and their cross-file references.
pub struct SpecificationResolver {
    transport: DynTransport,
}

impl SpecificationResolver {
    /// Create a resolver fetching remote documents through `transport`
    pub fn new(transport: DynTransport) -> Self { Self { transport } }

    /// Resolve the specification at `path`.
    pub async fn resolve_file(&self, path: &Path) -> Result<Specification> {
        self.resolve(&path.to_string_lossy()).await
    }

    /// Resolve the specification at `location` (a path, `file://` URI or URL).
    pub async fn resolve(&self, location: &str) -> Result<Specification> {
        let tree = self.resolve_tree(location).await?;
        Ok(Specification::from_value(tree)?)
    }

    /// Resolve the document at `location` into a reference-free YAML tree.
    pub async fn resolve_tree(&self, location: &str) -> Result<Value> {
        let location = Location::parse(location);
        let mut walk = Walk::default();

        let root = self.load(&location, &mut walk).await.map_err(|reason| ResolveError::Root {
            location: location.to_string(),
            reason,
        })?;
        let doc = Document { location, root };

        walk.stack.push(format!("{}#", doc.location));
        let resolved = self.resolve_node(doc.root.clone(), &doc, &mut walk).await;
        walk.stack.pop();

        tracing::debug!(
            "resolved {} reference(s) in {} ({} failed)",
            walk.attempted,
            doc.location,
            walk.failures.len()
        );

        match walk.failures.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(resolved),
        }
    }

    fn resolve_node<'a>(
        &'a self,
        node: Value,
        doc: &'a Document,
        walk: &'a mut Walk,
    ) -> BoxFuture<'a, Value> {
        Box::pin(async move {
            match node {
                Value::Mapping(map) => {
                    if let Some(reference) = reference_of(&map) {
                        return self.resolve_reference(reference, doc, walk).await;
                    }
                    let mut out = Mapping::with_capacity(map.len());
                    for (key, value) in map {
                        let value = self.resolve_node(value, doc, walk).await;
                        out.insert(key, value);
                    }
                    Value::Mapping(out)
                }
                Value::Sequence(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.resolve_node(item, doc, walk).await);
                    }
                    Value::Sequence(out)
                }
                Value::Tagged(mut tagged) => {
                    let inner = std::mem::take(&mut tagged.value);
                    tagged.value = self.resolve_node(inner, doc, walk).await;
                    Value::Tagged(tagged)
                }
                scalar => scalar,
            }
        })
    }

    async fn resolve_reference(&self, reference: String, doc: &Document, walk: &mut Walk) -> Value {
        walk.attempted += 1;
        let (target, fragment) = split_fragment(&reference);

        let target_location =
            if target.is_empty() { doc.location.clone() } else { doc.location.join(target) };
        let key = format!("{}#{}", target_location, fragment.unwrap_or(""));
        if walk.stack.contains(&key) {
            return walk.fail(&reference, doc, "reference cycle");
        }

        let target_root = if target.is_empty() {
            doc.root.clone()
        } else {
            match self.load(&target_location, walk).await {
                Ok(root) => root,
                Err(reason) => return walk.fail(&reference, doc, reason),
            }
        };

        let selected = match fragment {
            Some(ptr) => match pointer::select(&target_root, ptr) {
                Some(node) => node.clone(),
                None => {
                    return walk.fail(&reference, doc, format!("pointer '#{}' selects nothing", ptr))
                }
            },
            None => target_root.clone(),
        };

        tracing::debug!("resolving reference {} -> {}", reference, key);
        let target_doc = Document { location: target_location, root: target_root };
        walk.stack.push(key);
        let resolved = self.resolve_node(selected, &target_doc, walk).await;
        walk.stack.pop();
        resolved
    }

    /// Load and parse the document at `location`, caching the outcome.
    async fn load(
        &self,
        location: &Location,
        walk: &mut Walk,
    ) -> std::result::Result<Value, String> {
        let key = location.to_string();
        if let Some(cached) = walk.cache.get(&key) {
            return cached.clone();
        }

        let text = match location {
            Location::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| e.to_string()),
            Location::Url(url) => {
                tracing::debug!("fetching fragment {} via {}", url, self.transport.name());
                self.transport.fetch(url).await.map_err(|e| e.to_string())
            }
        };
        let outcome = text.and_then(|text| {
            serde_yaml::from_str::<Value>(&text).map_err(|e| format!("invalid YAML: {}", e))
        });

        walk.cache.insert(key, outcome.clone());
        outcome
    }
}

/// The target of a `{ $ref: "..." }` mapping, if `map` is one.
fn reference_of(map: &Mapping) -> Option<String> {
    map.get(REF_KEY).and_then(Value::as_str).map(str::to_string)
}
