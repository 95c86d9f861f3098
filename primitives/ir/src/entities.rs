//! Typed entities extracted from a specification.
//!
//! Each entity is a small owned value. Identifiers derived from them (query
//! names, pipe-module names) are used as cross-artifact keys by the code
//! generators, so they are plain `String`s that the generators validate
//! before embedding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP verbs a generated route may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
}

impl HttpMethod {
    /// Every recognized verb, in canonical order.
    pub const ALL: [HttpMethod; 6] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Lowercase verb as written in specifications and generated router calls.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Error returned when a string does not name one of the recognized verbs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized HTTP method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Parses a verb case-sensitively: specifications use lowercase keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// One declared data source of the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    /// Source type understood by the engine (e.g. `sparql`, `file`, `hypermedia`)
    #[serde(rename = "type")]
    pub source_type: String,
    /// Location of the source
    pub value: String,
}

impl DataSource {
    /// Create a data source of the given type.
    pub fn new(source_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self { source_type: source_type.into(), value: value.into() }
    }
}

/// An HTTP route: verb plus normalized path (`:param` syntax).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// HTTP verb
    pub method: HttpMethod,
    /// Path with runtime parameters written as `:name`
    pub path: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.as_str().to_uppercase(), self.path)
    }
}

/// A semantic query bound to one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Canonical identifier derived from `(method, path)`
    pub name: String,
    /// Single-line query text
    pub query: String,
    /// JSON-LD context, passed through unmodified
    pub context: Value,
}

/// A post-processing step as declared by a route, before its code is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipeModuleReference {
    /// Declared name; becomes the exported function name
    pub name: String,
    /// URI the module source is fetched from
    pub source: String,
}

impl PipeModuleReference {
    /// Create a reference.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { name: name.into(), source: source.into() }
    }

    /// Attach fetched source text, producing a loaded module.
    pub fn with_code(self, code: impl Into<String>) -> PipeModule {
        PipeModule { name: self.name, source: self.source, code: code.into() }
    }
}

/// A pipe-module whose source text has been fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeModule {
    /// Declared name
    pub name: String,
    /// URI the code was fetched from
    pub source: String,
    /// Trimmed source text (a function expression)
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_round_trips_through_str() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().parse::<HttpMethod>(), Ok(method));
        }
    }

    #[test]
    fn test_method_rejects_unknown_and_uppercase() {
        assert_eq!("options".parse::<HttpMethod>(), Err(UnknownMethod("options".into())));
        assert!("GET".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_route_display() {
        let route = Route { method: HttpMethod::Get, path: "/movies/:actor".into() };
        assert_eq!(route.to_string(), "GET /movies/:actor");
    }

    #[test]
    fn test_data_source_serializes_type_key() {
        let source = DataSource::new("sparql", "http://dbpedia.org/sparql");
        let json = serde_json::to_string(&source).expect("serialize data source");
        assert_eq!(json, r#"{"type":"sparql","value":"http://dbpedia.org/sparql"}"#);
    }

    #[test]
    fn test_with_code_keeps_name_and_source() {
        let module = PipeModuleReference::new("a", "http://x/a.js").with_code("(d) => d");
        assert_eq!(module.name, "a");
        assert_eq!(module.source, "http://x/a.js");
        assert_eq!(module.code, "(d) => d");
    }
}
