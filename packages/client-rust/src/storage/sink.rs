//! Storage sink trait and the error it surfaces to callers.

use std::path::{Path, PathBuf};

use nfe_core::Operation;

/// Destination for logged XML exchanges and converted responses.
///
/// Calls are synchronous: the response service finishes persisting before
/// it returns, so callers always see whether the exchange was saved.
///
/// Used as `Arc<dyn StorageSink>`.
pub trait StorageSink: Send + Sync {
    /// Create `path` (recursively) if it does not exist.
    fn ensure_dir(&self, path: &Path) -> anyhow::Result<()>;

    /// Write `content` to `<path>/<file_name>.xml`.
    fn save_xml(&self, path: &Path, file_name: &str, content: &str) -> anyhow::Result<()>;

    /// Write `content` as JSON to `<path>/<file_name>.json`.
    fn save_json(
        &self,
        path: &Path,
        file_name: &str,
        content: &serde_json::Value,
    ) -> anyhow::Result<()>;
}

/// Writing to storage failed.
///
/// Carries the full message chain of the underlying error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for PersistenceError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Directory used when no path is configured: `../tmp/<operation>/`.
#[must_use]
pub fn default_dir(operation: Operation) -> PathBuf {
    PathBuf::from(format!("../tmp/{}/", operation.wire_name()))
}

/// The configured directory, or [`default_dir`] when it is blank.
#[must_use]
pub fn resolve_dir(configured: &str, operation: Operation) -> PathBuf {
    if configured.trim().is_empty() {
        default_dir(operation)
    } else {
        PathBuf::from(configured)
    }
}
