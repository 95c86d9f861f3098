//! Text normalization for extracted entities.
//!
//! All functions here are pure and deterministic; running them twice on
//! their own output changes nothing.

use std::sync::OnceLock;

use ir::HttpMethod;
use regex::Regex;

/// Rewrite a declared path into the runtime parameter syntax.
///
/// Backslash escapes are dropped first, then every `{name}` segment becomes
/// `:name`. `/movies/{actor}` becomes `/movies/:actor`.
pub fn normalize_path(path: &str) -> String {
    static PARAM: OnceLock<Regex> = OnceLock::new();
    let param = PARAM.get_or_init(|| Regex::new(r"\{([^{}/]+)\}").expect("path parameter regex"));
    let unescaped = path.replace('\\', "");
    param.replace_all(&unescaped, ":$1").into_owned()
}

/// Canonical query name: the verb followed by the ASCII letters of the path.
///
/// `get /movies/{actor}` yields `getmoviesactor`.
pub fn derive_query_name(method: HttpMethod, path: &str) -> String {
    let mut name = method.as_str().to_string();
    name.extend(path.chars().filter(char::is_ascii_alphabetic));
    name
}

/// Single-line form of a query body.
///
/// Line breaks become spaces, runs of spaces collapse to one, and the
/// result is trimmed.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c == ' ' || c == '\n' || c == '\r' {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}
