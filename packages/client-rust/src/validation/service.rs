//! Asynchronous schema validation with normalized diagnostics.

use std::sync::Arc;

use nfe_core::diagnostic::normalize;
use nfe_core::Operation;
use serde::Serialize;
use tracing::{debug, warn};

use super::source::SchemaSource;
use super::validator::XsdValidator;
use crate::config::ValidationConfig;

/// Message returned for a document that passed validation.
pub const VALID_MESSAGE: &str = "XML válido.";

/// Message returned when no error was found but the validator did not check
/// the schema's content models.
pub const WELL_FORMED_MESSAGE: &str = "XML bem formado. Esquema não verificado por completo.";

/// Result of validating a document. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub success: bool,
    pub message: String,
}

impl ValidationOutcome {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            success: true,
            message: VALID_MESSAGE.to_string(),
        }
    }

    /// Success from a validator that only checked document structure.
    #[must_use]
    pub fn well_formed() -> Self {
        Self {
            success: true,
            message: WELL_FORMED_MESSAGE.to_string(),
        }
    }

    /// A failure whose message is the normalized form of `raw`.
    #[must_use]
    pub fn invalid(raw: &str) -> Self {
        Self {
            success: false,
            message: normalize(raw),
        }
    }
}

/// Validates outbound payloads against the schema of their operation.
///
/// Runs are independent; callers may drive any number concurrently.
#[derive(Clone)]
pub struct SchemaValidationService {
    schemas: Arc<dyn SchemaSource>,
    validator: Arc<dyn XsdValidator>,
    config: ValidationConfig,
}

impl SchemaValidationService {
    #[must_use]
    pub fn new(
        schemas: Arc<dyn SchemaSource>,
        validator: Arc<dyn XsdValidator>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            schemas,
            validator,
            config,
        }
    }

    async fn run(&self, xml: &str, operation: Operation) -> anyhow::Result<ValidationOutcome> {
        let schema = self.schemas.get_schema(operation).await?;
        let report = self.validator.validate(xml, &schema).await?;
        if report.valid {
            return Ok(if report.schema_checked {
                ValidationOutcome::valid()
            } else {
                ValidationOutcome::well_formed()
            });
        }
        let first = report
            .messages
            .first()
            .map_or("validator reported an invalid document without diagnostics", String::as_str);
        Ok(ValidationOutcome::invalid(first))
    }

    /// Validates `xml` against the schema for `operation`.
    ///
    /// Schema lookup failures, validator errors and timeouts all come back
    /// as a failed [`ValidationOutcome`].
    pub async fn validate(&self, xml: &str, operation: Operation) -> ValidationOutcome {
        let timeout = self.config.timeout;
        let outcome = match tokio::time::timeout(timeout, self.run(xml, operation)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => ValidationOutcome::invalid(&format!("{err:#}")),
            Err(_elapsed) => ValidationOutcome::invalid(&format!(
                "validation timed out after {}ms",
                timeout.as_millis()
            )),
        };

        if outcome.success {
            debug!(operation = %operation, "schema validation passed");
        } else {
            warn!(operation = %operation, message = %outcome.message, "schema validation failed");
        }
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::validation::source::InMemorySchemaSource;
    use crate::validation::validator::{ValidatorReport, WellFormedValidator};

    /// Validator returning a fixed report after an optional delay.
    struct FixedValidator {
        delay: Duration,
        result: Result<ValidatorReport, String>,
    }

    #[async_trait]
    impl XsdValidator for FixedValidator {
        async fn validate(&self, _xml: &str, _schema: &str) -> anyhow::Result<ValidatorReport> {
            tokio::time::sleep(self.delay).await;
            self.result.clone().map_err(anyhow::Error::msg)
        }
    }

    fn schemas() -> Arc<dyn SchemaSource> {
        Arc::new(InMemorySchemaSource::new().with_schema(Operation::StatusServico, "<xs:schema/>"))
    }

    fn service(validator: impl XsdValidator + 'static, timeout: Duration) -> SchemaValidationService {
        SchemaValidationService::new(schemas(), Arc::new(validator), ValidationConfig { timeout })
    }

    fn fixed(result: Result<ValidatorReport, String>) -> FixedValidator {
        FixedValidator {
            delay: Duration::ZERO,
            result,
        }
    }

    #[tokio::test]
    async fn valid_document_has_fixed_message() {
        let svc = service(fixed(Ok(ValidatorReport::valid())), Duration::from_secs(1));
        let outcome = svc.validate("<a/>", Operation::StatusServico).await;
        assert_eq!(outcome, ValidationOutcome::valid());
        assert_eq!(outcome.message, "XML válido.");
    }

    #[tokio::test]
    async fn structural_pass_does_not_claim_validity() {
        let svc = service(fixed(Ok(ValidatorReport::well_formed())), Duration::from_secs(1));
        let outcome = svc.validate("<a/>", Operation::StatusServico).await;
        assert!(outcome.success);
        assert_ne!(outcome.message, VALID_MESSAGE);
        assert_eq!(outcome.message, WELL_FORMED_MESSAGE);
    }

    #[tokio::test]
    async fn first_diagnostic_is_normalized() {
        let report = ValidatorReport {
            valid: false,
            schema_checked: true,
            messages: vec![
                "[error] E001: bad element (12:5)".to_string(),
                "[error] E002: other (13:1)".to_string(),
            ],
        };
        let svc = service(fixed(Ok(report)), Duration::from_secs(1));
        let outcome = svc.validate("<a/>", Operation::StatusServico).await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "Erro na Validação do XML: E001 na linha 12, coluna 5. Descrição: bad element"
        );
    }

    #[tokio::test]
    async fn validator_error_becomes_failed_outcome() {
        let svc = service(fixed(Err("java not found".to_string())), Duration::from_secs(1));
        let outcome = svc.validate("<a/>", Operation::StatusServico).await;
        assert_eq!(
            outcome.message,
            "Erro Não Identificado na Validação do XML: java not found"
        );
    }

    #[tokio::test]
    async fn missing_schema_becomes_failed_outcome() {
        let svc = service(fixed(Ok(ValidatorReport::valid())), Duration::from_secs(1));
        let outcome = svc.validate("<a/>", Operation::Autorizacao).await;
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Erro Não Identificado"));
        assert!(outcome.message.contains("NFEAutorizacao"));
    }

    #[tokio::test]
    async fn slow_validator_times_out() {
        let validator = FixedValidator {
            delay: Duration::from_millis(500),
            result: Ok(ValidatorReport::valid()),
        };
        let svc = service(validator, Duration::from_millis(20));
        let outcome = svc.validate("<a/>", Operation::StatusServico).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("timed out after 20ms"));
    }

    #[tokio::test]
    async fn concurrent_validations_are_independent() {
        let svc = service(WellFormedValidator, Duration::from_secs(5));
        let (good, bad) = tokio::join!(
            svc.validate("<consStatServ/>", Operation::StatusServico),
            svc.validate("<consStatServ>", Operation::StatusServico),
        );
        assert_eq!(good, ValidationOutcome::well_formed());
        assert!(!bad.success);
        assert!(bad.message.starts_with("Erro na Validação do XML: malformed na linha 1"));
    }
}
