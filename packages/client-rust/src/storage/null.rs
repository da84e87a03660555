//! No-op [`StorageSink`] implementation.
//!
//! [`NullStorageSink`] accepts every write and stores nothing. Useful for
//! tests and for deployments that never keep exchanges.

use std::path::Path;

use super::sink::StorageSink;

/// `StorageSink` that discards all writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStorageSink;

impl StorageSink for NullStorageSink {
    fn ensure_dir(&self, _path: &Path) -> anyhow::Result<()> {
        Ok(())
    }

    fn save_xml(&self, _path: &Path, _file_name: &str, _content: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn save_json(
        &self,
        _path: &Path,
        _file_name: &str,
        _content: &serde_json::Value,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
