//! Output side of code generation.
//!
//! A sink knows how to create (or truncate) each artifact before a run and
//! how to append text to it. Writers own one artifact each and are the only
//! callers of `append` for that artifact.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The three generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// Query-execution module
    Query,
    /// Pipe-module module
    PipeModules,
    /// Routing module
    Routes,
}

impl ArtifactKind {
    /// All artifacts, in emission order within a pair.
    pub const ALL: [ArtifactKind; 3] =
        [ArtifactKind::PipeModules, ArtifactKind::Query, ArtifactKind::Routes];

    /// File name of the artifact inside the output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Query => "executeQuery.js",
            ArtifactKind::PipeModules => "pipeModules.js",
            ArtifactKind::Routes => "routes.js",
        }
    }

    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Query => "query",
            ArtifactKind::PipeModules => "pipe-modules",
            ArtifactKind::Routes => "routes",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Destination for generated artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Create the artifact empty, discarding any previous content.
    fn create(&self, kind: ArtifactKind) -> io::Result<()>;

    /// Append `text` to a previously created artifact.
    fn append(&self, kind: ArtifactKind, text: &str) -> io::Result<()>;
}

/// Writes artifacts as files in one directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Sink writing into `dir`; the directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    /// Output directory.
    pub fn dir(&self) -> &Path { &self.dir }

    /// Full path of an artifact.
    pub fn path_of(&self, kind: ArtifactKind) -> PathBuf { self.dir.join(kind.file_name()) }
}

impl ArtifactSink for FileSink {
    fn create(&self, kind: ArtifactKind) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        File::create(self.path_of(kind))?;
        Ok(())
    }

    fn append(&self, kind: ArtifactKind, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(self.path_of(kind))?;
        file.write_all(text.as_bytes())
    }
}

#[derive(Debug, Default)]
struct MemoryArtifact {
    content: String,
    appends: usize,
}

/// In-memory sink, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<BTreeMap<ArtifactKind, MemoryArtifact>>,
}

impl MemorySink {
    /// Empty sink with no artifacts created.
    pub fn new() -> Self { Self::default() }

    /// Content of an artifact, or `None` if it was never created.
    pub fn contents(&self, kind: ArtifactKind) -> Option<String> {
        let artifacts = self.artifacts.lock().unwrap_or_else(|e| e.into_inner());
        artifacts.get(&kind).map(|a| a.content.clone())
    }

    /// Number of appends made to an artifact since it was created.
    pub fn append_count(&self, kind: ArtifactKind) -> usize {
        let artifacts = self.artifacts.lock().unwrap_or_else(|e| e.into_inner());
        artifacts.get(&kind).map(|a| a.appends).unwrap_or(0)
    }

    /// Whether any artifact has been created.
    pub fn is_empty(&self) -> bool {
        self.artifacts.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn create(&self, kind: ArtifactKind) -> io::Result<()> {
        let mut artifacts = self.artifacts.lock().unwrap_or_else(|e| e.into_inner());
        artifacts.insert(kind, MemoryArtifact::default());
        Ok(())
    }

    fn append(&self, kind: ArtifactKind, text: &str) -> io::Result<()> {
        let mut artifacts = self.artifacts.lock().unwrap_or_else(|e| e.into_inner());
        let artifact = artifacts.get_mut(&kind).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} has not been created", kind))
        })?;
        artifact.content.push_str(text);
        artifact.appends += 1;
        Ok(())
    }
}
