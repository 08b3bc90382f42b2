// ABOUTME: Chart source handlers and their explicit registration table.
// ABOUTME: No hidden singletons; the registry is built at startup and passed around.

mod registry;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use registry::{SourceConstructor, SourceEntry, SourceRegistry};

/// Declaration of where a chart's artifacts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Handler key, e.g. `"local"`.
    pub source_type: String,
    /// Handler-specific location: a path, a URL, a ref.
    pub location: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no source handler registered for type {0}")]
    UnknownSourceType(String),

    #[error("chart source not found at {0}")]
    NotFound(PathBuf),
}

/// A handler that can materialize chart artifacts for packaging.
///
/// Fetching and packaging are outside the reconciliation core; handlers are
/// the seam the artifact pipeline plugs into.
pub trait ChartSource: Send + Sync + std::fmt::Debug {
    /// Make the chart contents available locally and return their path.
    fn sync(&self) -> Result<PathBuf, SourceError>;
}

/// Source handler for charts already present on the local filesystem.
#[derive(Debug)]
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl ChartSource for LocalSource {
    fn sync(&self) -> Result<PathBuf, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::NotFound(self.path.clone()));
        }
        Ok(self.path.clone())
    }
}
