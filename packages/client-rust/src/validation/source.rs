//! Where XSD documents come from.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use nfe_core::Operation;

/// Provides the schema document that validates an operation's payload.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Returns the XSD text for `operation`.
    async fn get_schema(&self, operation: Operation) -> anyhow::Result<String>;
}

/// Schemas held in memory, registered per operation.
#[derive(Debug, Default, Clone)]
pub struct InMemorySchemaSource {
    schemas: HashMap<Operation, String>,
}

impl InMemorySchemaSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` for `operation`, replacing any previous one.
    #[must_use]
    pub fn with_schema(mut self, operation: Operation, schema: impl Into<String>) -> Self {
        self.schemas.insert(operation, schema.into());
        self
    }
}

#[async_trait]
impl SchemaSource for InMemorySchemaSource {
    async fn get_schema(&self, operation: Operation) -> anyhow::Result<String> {
        self.schemas
            .get(&operation)
            .cloned()
            .with_context(|| format!("no schema registered for {operation}"))
    }
}

/// Reads `<dir>/<schema file of the operation>` on every call.
#[derive(Debug, Clone)]
pub struct DirSchemaSource {
    dir: PathBuf,
}

impl DirSchemaSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SchemaSource for DirSchemaSource {
    async fn get_schema(&self, operation: Operation) -> anyhow::Result<String> {
        let path = self.dir.join(operation.schema_file_name());
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read schema {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_returns_registered_schema() {
        let source = InMemorySchemaSource::new().with_schema(Operation::StatusServico, "<xs:schema/>");
        assert_eq!(
            source.get_schema(Operation::StatusServico).await.unwrap(),
            "<xs:schema/>"
        );
        let err = source.get_schema(Operation::Autorizacao).await.unwrap_err();
        assert!(err.to_string().contains("NFEAutorizacao"));
    }

    #[tokio::test]
    async fn dir_source_reads_operation_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("consStatServ_v4.00.xsd"), "<xs:schema/>").unwrap();
        let source = DirSchemaSource::new(tmp.path());

        assert_eq!(
            source.get_schema(Operation::StatusServico).await.unwrap(),
            "<xs:schema/>"
        );
        let err = source.get_schema(Operation::Inutilizacao).await.unwrap_err();
        assert!(format!("{err:#}").contains("inutNFe_v4.00.xsd"));
    }
}
