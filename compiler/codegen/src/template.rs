//! Positional template substitution with typed slots.
//!
//! Templates contain markers `{{0}}`, `{{1}}`, ... that are replaced by the
//! slot at that position. How a slot is rendered depends on its type, so the
//! escaping decision is made here rather than by each caller:
//!
//! | Slot | Rendering |
//! |---|---|
//! | [`Slot::Str`] | single-quoted JavaScript string literal |
//! | [`Slot::Ident`] | verbatim, after checking the identifier grammar |
//! | [`Slot::Json`] | compact JSON serialization |
//! | [`Slot::Raw`] | verbatim |
//!
//! `{{` not followed by `digits}}` is literal text.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A marker refers to a position with no slot
    #[error("template marker {{{{{index}}}}} has no argument ({provided} provided)")]
    MissingArgument {
        /// Marker index
        index: usize,
        /// Number of slots supplied
        provided: usize,
    },
    /// An identifier slot holds something that is not an identifier
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    /// JSON serialization failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A typed substitution argument.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    /// Text embedded as a quoted string literal
    Str(&'a str),
    /// An identifier embedded verbatim after validation
    Ident(&'a str),
    /// A structured value embedded as JSON
    Json(&'a Value),
    /// Trusted text embedded verbatim
    Raw(&'a str),
}

impl Slot<'_> {
    fn render(&self) -> Result<String, TemplateError> {
        match self {
            Slot::Str(s) => Ok(string_literal(s)),
            Slot::Ident(s) => {
                if is_identifier(s) {
                    Ok((*s).to_string())
                } else {
                    Err(TemplateError::InvalidIdentifier((*s).to_string()))
                }
            }
            Slot::Json(v) => Ok(serde_json::to_string(v)?),
            Slot::Raw(s) => Ok((*s).to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Marker(usize),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// Split `source` into literal text and markers.
    pub fn parse(source: &str) -> Self {
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            let marker = if digits > 0 && after[digits..].starts_with("}}") {
                after[..digits].parse::<usize>().ok()
            } else {
                None
            };

            match marker {
                Some(index) => {
                    text.push_str(&rest[..start]);
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Marker(index));
                    rest = &after[digits + 2..];
                }
                None => {
                    text.push_str(&rest[..start + 2]);
                    rest = after;
                }
            }
        }
        text.push_str(rest);
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        Self { pieces }
    }

    /// Number of slots the template needs (highest marker + 1).
    pub fn arity(&self) -> usize {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Marker(i) => Some(i + 1),
                Piece::Text(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Substitute `args` into the template.
    pub fn render(&self, args: &[Slot<'_>]) -> Result<String, TemplateError> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Marker(index) => {
                    let slot = args.get(*index).ok_or(TemplateError::MissingArgument {
                        index: *index,
                        provided: args.len(),
                    })?;
                    out.push_str(&slot.render()?);
                }
            }
        }
        Ok(out)
    }
}

/// Parse and render `template` in one step.
pub fn render(template: &str, args: &[Slot<'_>]) -> Result<String, TemplateError> {
    Template::parse(template).render(args)
}

/// JavaScript reserved words, which cannot be used as binding names.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Names the CommonJS module wrapper binds in every module scope.
const MODULE_BINDINGS: &[&str] = &["exports", "module", "require", "__filename", "__dirname"];

/// Whether `name` is bound by the CommonJS module wrapper.
///
/// A top-level `const` with one of these names shadows the wrapper's binding,
/// so generated module-level definitions must avoid them.
pub fn is_module_binding(name: &str) -> bool {
    MODULE_BINDINGS.contains(&name)
}

/// Whether `name` can be used as a JavaScript binding name.
pub fn is_identifier(name: &str) -> bool {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    let grammar = GRAMMAR
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex"));
    grammar.is_match(name) && !RESERVED_WORDS.contains(&name)
}

/// Quote `s` as a single-quoted JavaScript string literal.
fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // pre-ES2019 engines treat these as line terminators
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
