//! Process-wide environment settings consumed by the core.
//!
//! Loaded once at startup and shared read-only (`Arc<EnvironmentConfig>`).

use serde::{Deserialize, Serialize};

/// Document version used when a caller does not ask for a specific one.
pub const DEFAULT_DOCUMENT_VERSION: &str = "4.00";

/// Target environment of the state webservices.
///
/// On the wire this is the numeric `tpAmb` code: `1` production,
/// `2` homologation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Environment {
    Production,
    #[default]
    Homologation,
}

impl Environment {
    /// One-letter suffix used in endpoint parent keys.
    #[must_use]
    pub fn scope_suffix(self) -> &'static str {
        match self {
            Self::Production => "P",
            Self::Homologation => "H",
        }
    }
}

impl TryFrom<u8> for Environment {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Production),
            2 => Ok(Self::Homologation),
            other => Err(format!("invalid environment code {other}, expected 1 or 2")),
        }
    }
}

impl From<Environment> for u8 {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Production => 1,
            Environment::Homologation => 2,
        }
    }
}

/// Environment configuration: target environment, issuing state and the
/// persistence toggles for logged exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub environment: Environment,
    /// Two-letter state code (`UF`), e.g. `"SP"`.
    pub state_code: String,
    /// Version used when the caller passes an empty one.
    pub default_version: String,
    /// Save outbound request XML.
    pub store_query_xml: bool,
    /// Save the SOAP-wrapped request instead of the bare payload.
    pub store_query_with_soap_envelope: bool,
    /// Directory for outbound requests; empty means `../tmp/<operation>/`.
    pub query_xml_path: String,
    /// Save inbound response XML.
    pub store_result_xml: bool,
    /// Also save the converted response tree as JSON (requires `store_result_xml`).
    pub store_result_as_json: bool,
    /// Directory for responses; empty means `../tmp/<operation>/`.
    pub result_xml_path: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Homologation,
            state_code: String::new(),
            default_version: DEFAULT_DOCUMENT_VERSION.to_string(),
            store_query_xml: false,
            store_query_with_soap_envelope: false,
            query_xml_path: String::new(),
            store_result_xml: false,
            store_result_as_json: false,
            result_xml_path: String::new(),
        }
    }
}
