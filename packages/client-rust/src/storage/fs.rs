//! Filesystem [`StorageSink`].

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use super::sink::StorageSink;

/// Writes exchanges as plain files under the given directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorageSink;

impl FsStorageSink {
    fn write(path: &Path, file_name: &str, extension: &str, content: &[u8]) -> anyhow::Result<()> {
        let target = path.join(format!("{file_name}.{extension}"));
        fs::write(&target, content)
            .with_context(|| format!("failed to write {}", target.display()))?;
        debug!(file = %target.display(), bytes = content.len(), "saved exchange");
        Ok(())
    }
}

impl StorageSink for FsStorageSink {
    fn ensure_dir(&self, path: &Path) -> anyhow::Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("failed to create directory {}", path.display()))?;
        }
        Ok(())
    }

    fn save_xml(&self, path: &Path, file_name: &str, content: &str) -> anyhow::Result<()> {
        Self::write(path, file_name, "xml", content.as_bytes())
    }

    fn save_json(
        &self,
        path: &Path,
        file_name: &str,
        content: &serde_json::Value,
    ) -> anyhow::Result<()> {
        let body = serde_json::to_vec(content).context("failed to encode JSON")?;
        Self::write(path, file_name, "json", &body)
    }
}
