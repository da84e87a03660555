//! Response handling: classify a webservice response and persist the
//! exchange according to the environment toggles.

use std::path::Path;
use std::sync::Arc;

use nfe_core::{
    classify, log_file_name, Classification, ClassifiedResponse, EnvironmentConfig, Node,
    Operation, RejectionError, Stage, TreeError,
};
use tracing::{info, warn};

use crate::storage::{resolve_dir, PersistenceError, StorageSink};

/// Errors returned while handling a response.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The response body is not well-formed XML.
    #[error(transparent)]
    Parse(#[from] TreeError),
    /// The service refused the document (exception-style call sites only).
    #[error(transparent)]
    Rejected(#[from] RejectionError),
    /// The exchange could not be saved. The classification had already been
    /// computed and is returned alongside the failure.
    #[error("{source}")]
    Persistence {
        source: PersistenceError,
        classification: Box<Classification>,
    },
}

/// Classifies responses and logs exchanges through a [`StorageSink`].
#[derive(Clone)]
pub struct ResponseService {
    config: Arc<EnvironmentConfig>,
    sink: Arc<dyn StorageSink>,
}

impl ResponseService {
    #[must_use]
    pub fn new(config: Arc<EnvironmentConfig>, sink: Arc<dyn StorageSink>) -> Self {
        Self { config, sink }
    }

    /// Converts, classifies and persists a raw response.
    ///
    /// Persistence runs after classification; a rejected response is still
    /// saved. `file_name` overrides the default `<label>-retorno` name.
    ///
    /// # Errors
    ///
    /// - `ResponseError::Parse` if `raw` is not well-formed XML (nothing is saved)
    /// - `ResponseError::Persistence` if saving fails, carrying the classification
    pub fn classify(
        &self,
        raw: &str,
        operation: Operation,
        file_name: Option<&str>,
    ) -> Result<Classification, ResponseError> {
        let classification = classify(raw)?;

        if let Err(source) = self.persist_result(raw, classification.response(), operation, file_name)
        {
            warn!(operation = %operation, error = %source, "failed to persist response");
            return Err(ResponseError::Persistence {
                source,
                classification: Box::new(classification),
            });
        }

        match &classification {
            Classification::Rejected { reason, .. } => {
                warn!(operation = %operation, reason = %reason, "response rejected");
            }
            Classification::Accepted(response) => {
                info!(
                    operation = %operation,
                    reason = response.reason.as_deref().unwrap_or_default(),
                    protocol = response
                        .protocol
                        .as_ref()
                        .and_then(|p| p.protocol_number())
                        .unwrap_or_default(),
                    "response accepted"
                );
            }
        }
        Ok(classification)
    }

    /// [`classify`](Self::classify), turning a rejection into an error.
    ///
    /// # Errors
    ///
    /// Everything `classify` returns, plus `ResponseError::Rejected`.
    pub fn check(
        &self,
        raw: &str,
        operation: Operation,
        file_name: Option<&str>,
    ) -> Result<ClassifiedResponse, ResponseError> {
        Ok(self.classify(raw, operation, file_name)?.into_result()?)
    }

    fn persist_result(
        &self,
        raw: &str,
        response: &ClassifiedResponse,
        operation: Operation,
        file_name: Option<&str>,
    ) -> Result<(), PersistenceError> {
        if !self.config.store_result_xml {
            return Ok(());
        }
        let file_name = file_name.map_or_else(|| log_file_name(operation, Stage::Result), str::to_owned);
        let dir = resolve_dir(&self.config.result_xml_path, operation);

        self.sink.ensure_dir(&dir)?;
        self.sink.save_xml(&dir, &file_name, raw)?;
        if self.config.store_result_as_json {
            let json = serde_json::to_value(&response.tree)?;
            self.sink.save_json(&dir, &file_name, &json)?;
        }
        Ok(())
    }

    /// Saves the outbound request when `store_query_xml` is enabled.
    ///
    /// `soap_xml` is the envelope-wrapped request; it is saved instead of
    /// `query_xml` when `store_query_with_soap_envelope` is set.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the sink fails.
    pub fn persist_query(
        &self,
        query_xml: &str,
        soap_xml: &str,
        operation: Operation,
        file_name: Option<&str>,
    ) -> Result<(), PersistenceError> {
        if !self.config.store_query_xml {
            return Ok(());
        }
        let file_name = file_name.map_or_else(|| log_file_name(operation, Stage::Query), str::to_owned);
        let content = if self.config.store_query_with_soap_envelope {
            soap_xml
        } else {
            query_xml
        };
        let dir = resolve_dir(&self.config.query_xml_path, operation);
        self.save(&dir, &file_name, content)
    }

    /// Saves an authorized document under the response directory.
    ///
    /// Without `file_name`, the access key (`chNFe`) found in `tree` names
    /// the file.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if no file name can be determined or the
    /// sink fails.
    pub fn persist_document(
        &self,
        tree: &Node,
        xml: &str,
        operation: Operation,
        file_name: Option<&str>,
    ) -> Result<(), PersistenceError> {
        let file_name = match file_name.filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => tree.find_text("chNFe").filter(|key| !key.is_empty()).ok_or_else(|| {
                PersistenceError::new("document has no chNFe to name the file after")
            })?,
        };
        let dir = resolve_dir(&self.config.result_xml_path, operation);
        self.save(&dir, file_name, xml)
    }

    fn save(&self, dir: &Path, file_name: &str, content: &str) -> Result<(), PersistenceError> {
        self.sink.ensure_dir(dir)?;
        self.sink.save_xml(dir, file_name, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
