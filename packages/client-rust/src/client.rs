//! Entry point bundling configuration, static tables and services.

use std::sync::Arc;

use nfe_core::{
    log_file_name, Classification, ClassifiedResponse, ConfigurationError, EndpointTable,
    EnvironmentConfig, MethodDescriptor, MethodTable, Operation, Stage,
};

use crate::config::ValidationConfig;
use crate::service::{ResponseError, ResponseService};
use crate::storage::{PersistenceError, StorageSink};
use crate::validation::{
    SchemaSource, SchemaValidationService, ValidationOutcome, XsdValidator,
};

/// The surface offered to transport-layer callers.
///
/// Configuration and tables are loaded once and shared read-only; the
/// client itself is cheap to clone.
#[derive(Clone)]
pub struct NfeClient {
    config: Arc<EnvironmentConfig>,
    endpoints: Arc<EndpointTable>,
    methods: Arc<MethodTable>,
    responses: ResponseService,
    validation: SchemaValidationService,
}

impl NfeClient {
    /// Creates a client with the bundled tables and the default
    /// validation settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTable` if a bundled table is
    /// malformed.
    pub fn new(
        config: EnvironmentConfig,
        sink: Arc<dyn StorageSink>,
        schemas: Arc<dyn SchemaSource>,
        validator: Arc<dyn XsdValidator>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::with_parts(
            config,
            EndpointTable::bundled()?,
            MethodTable::bundled()?,
            sink,
            schemas,
            validator,
            ValidationConfig::default(),
        ))
    }

    /// Creates a client from explicit tables and collaborators.
    #[must_use]
    pub fn with_parts(
        config: EnvironmentConfig,
        endpoints: EndpointTable,
        methods: MethodTable,
        sink: Arc<dyn StorageSink>,
        schemas: Arc<dyn SchemaSource>,
        validator: Arc<dyn XsdValidator>,
        validation_config: ValidationConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            responses: ResponseService::new(Arc::clone(&config), sink),
            validation: SchemaValidationService::new(schemas, validator, validation_config),
            config,
            endpoints: Arc::new(endpoints),
            methods: Arc::new(methods),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Webservice URL for `operation`. An empty `version` means the
    /// configured default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnresolvedEndpoint` when the table has
    /// no entry for the resolved key.
    pub fn resolve_url(
        &self,
        operation: Operation,
        national_scope: bool,
        version: &str,
    ) -> Result<&str, ConfigurationError> {
        self.endpoints
            .resolve_url(&self.config, operation, national_scope, version)
    }

    /// SOAP method and action for `operation`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownMethod` when the table lacks it.
    pub fn resolve_method(
        &self,
        operation: Operation,
    ) -> Result<&MethodDescriptor, ConfigurationError> {
        self.methods.resolve(operation)
    }

    #[must_use]
    pub fn log_file_name(&self, operation: Operation, stage: Stage) -> String {
        log_file_name(operation, stage)
    }

    /// See [`ResponseService::classify`].
    ///
    /// # Errors
    ///
    /// See [`ResponseService::classify`].
    pub fn classify(
        &self,
        raw: &str,
        operation: Operation,
        file_name: Option<&str>,
    ) -> Result<Classification, ResponseError> {
        self.responses.classify(raw, operation, file_name)
    }

    /// See [`ResponseService::check`].
    ///
    /// # Errors
    ///
    /// See [`ResponseService::check`].
    pub fn check(
        &self,
        raw: &str,
        operation: Operation,
        file_name: Option<&str>,
    ) -> Result<ClassifiedResponse, ResponseError> {
        self.responses.check(raw, operation, file_name)
    }

    /// See [`ResponseService::persist_query`].
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
        self.responses
            .persist_query(query_xml, soap_xml, operation, file_name)
    }

    /// Validates an outbound payload against its operation schema.
    pub async fn validate(&self, xml: &str, operation: Operation) -> ValidationOutcome {
        self.validation.validate(xml, operation).await
    }
}

#[cfg(test)]
mod tests {
    use nfe_core::Environment;

    use super::*;
    use crate::storage::NullStorageSink;
    use crate::validation::{InMemorySchemaSource, WellFormedValidator, VALID_MESSAGE};

    const STATUS_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="consStatServ">
    <xs:complexType><xs:sequence><xs:element name="tpAmb"/></xs:sequence></xs:complexType>
  </xs:element>
</xs:schema>"#;

    fn client(environment: Environment) -> NfeClient {
        let config = EnvironmentConfig {
            environment,
            state_code: "SP".to_string(),
            ..EnvironmentConfig::default()
        };
        let schemas = InMemorySchemaSource::new().with_schema(Operation::StatusServico, STATUS_SCHEMA);
        NfeClient::new(
            config,
            Arc::new(NullStorageSink),
            Arc::new(schemas),
            Arc::new(WellFormedValidator),
        )
        .unwrap()
    }

    #[test]
    fn resolves_state_and_national_urls() {
        let prod = client(Environment::Production);
        assert_eq!(
            prod.resolve_url(Operation::Autorizacao, false, "").unwrap(),
            "https://nfe.fazenda.sp.gov.br/ws/nfeautorizacao4.asmx"
        );
        let hom = client(Environment::Homologation);
        assert_eq!(
            hom.resolve_url(Operation::DistribuicaoDFe, true, "1.01").unwrap(),
            "https://hom1.nfe.fazenda.gov.br/NFeDistribuicaoDFe/NFeDistribuicaoDFe.asmx"
        );
    }

    #[test]
    fn unresolved_url_names_child_key() {
        let err = client(Environment::Production)
            .resolve_url(Operation::StatusServico, false, "9.99")
            .unwrap_err();
        assert!(err.to_string().contains("NFEStatusServico_9.99"));
    }

    #[test]
    fn resolves_method_and_log_name() {
        let c = client(Environment::Homologation);
        assert_eq!(
            c.resolve_method(Operation::StatusServico).unwrap().verb,
            "nfeStatusServicoNF"
        );
        assert_eq!(
            c.log_file_name(Operation::Cancelamento, Stage::Query),
            "NFECancelamento-consulta"
        );
    }

    #[test]
    fn classify_and_check_share_one_pipeline() {
        let c = client(Environment::Homologation);
        let raw = "<retConsStatServ><cStat>107</cStat><xMotivo>Servico em Operacao</xMotivo></retConsStatServ>";
        let outcome = c.classify(raw, Operation::StatusServico, None).unwrap();
        assert!(!outcome.is_rejected());
        let response = c.check(raw, Operation::StatusServico, None).unwrap();
        assert_eq!(response.reason.as_deref(), Some("Servico em Operacao"));
    }

    #[tokio::test]
    async fn structural_validator_never_reports_schema_validity() {
        let c = client(Environment::Homologation);
        let outcome = c
            .validate("<consStatServ versao=\"4.00\"><tpAmb>2</tpAmb></consStatServ>", Operation::StatusServico)
            .await;
        assert!(outcome.success);
        assert_ne!(outcome.message, VALID_MESSAGE);
    }

    #[tokio::test]
    async fn document_with_undeclared_root_is_not_valid() {
        let c = client(Environment::Homologation);
        let outcome = c
            .validate("<totallyWrongRoot><foo/></totallyWrongRoot>", Operation::StatusServico)
            .await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "Erro na Validação do XML: root na linha 1, coluna 1. Descrição: element 'totallyWrongRoot' is not declared by the schema"
        );
    }
}
