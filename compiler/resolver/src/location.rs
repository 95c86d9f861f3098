//! Document locations and reference joining.
//!
//! A reference is interpreted relative to the document that contains it:
//! relative to the directory for files, relative to the last `/` for URLs.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use transport::is_remote;

/// Where a YAML document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A local file
    File(PathBuf),
    /// An `http(s)://` URL
    Url(String),
}

impl Location {
    /// Interpret a top-level location given by the caller.
    pub fn parse(location: &str) -> Self {
        if is_remote(location) {
            Location::Url(location.to_string())
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            Location::File(normalize_path(Path::new(path)))
        }
    }

    /// Resolve `target` (without fragment) against this location.
    pub fn join(&self, target: &str) -> Self {
        if is_remote(target) {
            return Location::Url(target.to_string());
        }
        if let Some(path) = target.strip_prefix("file://") {
            return Location::File(normalize_path(Path::new(path)));
        }
        match self {
            Location::File(path) => {
                let target = Path::new(target);
                if target.is_absolute() {
                    Location::File(normalize_path(target))
                } else {
                    let dir = path.parent().unwrap_or_else(|| Path::new(""));
                    Location::File(normalize_path(&dir.join(target)))
                }
            }
            Location::Url(url) => Location::Url(join_url(url, target)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => f.write_str(url),
        }
    }
}

/// Split a reference into its target and optional `#fragment`.
pub fn split_fragment(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((target, fragment)) => (target, Some(fragment)),
        None => (reference, None),
    }
}

/// Lexically remove `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn join_url(base: &str, target: &str) -> String {
    let (origin, path) = split_origin(base);
    let joined = if target.starts_with('/') {
        target.to_string()
    } else {
        let dir_end = path.rfind('/').map_or(0, |i| i + 1);
        format!("{}{}", &path[..dir_end], target)
    };
    format!("{}{}", origin, normalize_url_path(&joined))
}

fn split_origin(url: &str) -> (&str, &str) {
    let after_scheme = url.find("://").map_or(0, |i| i + 3);
    match url[after_scheme..].find('/') {
        Some(i) => url.split_at(after_scheme + i),
        None => (url, "/"),
    }
}

fn normalize_url_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/').skip(1) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
