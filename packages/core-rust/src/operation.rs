//! Closed vocabulary of webservice operations.
//!
//! Both the method table and log-file naming key off [`Operation`], so the
//! two lookups can never disagree about which names exist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A fiscal-document webservice action.
///
/// Wire names follow the state-service naming used by the endpoint and
/// SOAP method tables (note the mixed `NFE`/`NFe` casing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    /// Service status query.
    #[serde(rename = "NFEStatusServico")]
    StatusServico,
    /// Protocol (document situation) query.
    #[serde(rename = "NFEConsultaProtocolo")]
    ConsultaProtocolo,
    /// Distribution of documents addressed to a taxpayer.
    #[serde(rename = "NFeDistribuicaoDFe")]
    DistribuicaoDFe,
    /// Event submission (correction letter, manifestation, ...).
    #[serde(rename = "RecepcaoEvento")]
    RecepcaoEvento,
    /// Cancellation event.
    #[serde(rename = "NFECancelamento")]
    Cancelamento,
    /// Voiding of an unused numbering range.
    #[serde(rename = "NFEInutilizacao")]
    Inutilizacao,
    /// Authorization submission (document transmission).
    #[serde(rename = "NFEAutorizacao")]
    Autorizacao,
    /// Polling for the result of an asynchronous authorization batch.
    #[serde(rename = "NFERetornoAutorizacao")]
    RetornoAutorizacao,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Operation; 8] = [
        Operation::StatusServico,
        Operation::ConsultaProtocolo,
        Operation::DistribuicaoDFe,
        Operation::RecepcaoEvento,
        Operation::Cancelamento,
        Operation::Inutilizacao,
        Operation::Autorizacao,
        Operation::RetornoAutorizacao,
    ];

    /// Name used as table key and in endpoint child keys.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::StatusServico => "NFEStatusServico",
            Self::ConsultaProtocolo => "NFEConsultaProtocolo",
            Self::DistribuicaoDFe => "NFeDistribuicaoDFe",
            Self::RecepcaoEvento => "RecepcaoEvento",
            Self::Cancelamento => "NFECancelamento",
            Self::Inutilizacao => "NFEInutilizacao",
            Self::Autorizacao => "NFEAutorizacao",
            Self::RetornoAutorizacao => "NFERetornoAutorizacao",
        }
    }

    /// Label used as the stem of request/response log file names.
    #[must_use]
    pub fn log_label(self) -> &'static str {
        match self {
            Self::StatusServico => "NFeStatusServico",
            Self::ConsultaProtocolo => "NFeConsultaProtocolo",
            Self::DistribuicaoDFe => "NFeDistribuicaoDFe",
            Self::RecepcaoEvento => "RecepcaoEvento",
            Self::Cancelamento => "NFECancelamento",
            Self::Inutilizacao => "NFEInutilizacao",
            Self::Autorizacao => "NFEAutorizacao",
            Self::RetornoAutorizacao => "NFERetornoAutorizacao",
        }
    }

    /// File name of the XSD that validates this operation's outbound payload.
    #[must_use]
    pub fn schema_file_name(self) -> &'static str {
        match self {
            Self::StatusServico => "consStatServ_v4.00.xsd",
            Self::ConsultaProtocolo => "consSitNFe_v4.00.xsd",
            Self::DistribuicaoDFe => "distDFeInt_v1.01.xsd",
            Self::RecepcaoEvento => "envEvento_v1.00.xsd",
            Self::Cancelamento => "envEventoCancNFe_v1.00.xsd",
            Self::Inutilizacao => "inutNFe_v4.00.xsd",
            Self::Autorizacao => "enviNFe_v4.00.xsd",
            Self::RetornoAutorizacao => "consReciNFe_v4.00.xsd",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Operation {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.wire_name() == s)
            .ok_or_else(|| ConfigurationError::UnknownOperation {
                name: s.to_string(),
            })
    }
}

/// Direction of a logged exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The outbound request sent to the webservice.
    Query,
    /// The inbound response received from it.
    Result,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "consulta",
            Self::Result => "retorno",
        }
    }
}

/// Default file name (without extension) for a logged exchange.
#[must_use]
pub fn log_file_name(operation: Operation, stage: Stage) -> String {
    format!("{}-{}", operation.log_label(), stage.as_str())
}

/// [`log_file_name`] for a free-form operation name.
///
/// # Errors
///
/// Returns `ConfigurationError::UnknownOperation` if `name` is not in the
/// vocabulary; file names are never defaulted.
pub fn log_file_name_for(name: &str, stage: Stage) -> Result<String, ConfigurationError> {
    let operation: Operation = name.parse()?;
    Ok(log_file_name(operation, stage))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
