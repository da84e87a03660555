//! SOAP method registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::operation::Operation;

const BUNDLED_METHODS: &str = include_str!("../tables/methods.json");

/// Transport verb and protocol action for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// SOAP body method name, e.g. `nfeAutorizacaoLote`.
    #[serde(rename = "method")]
    pub verb: String,
    /// `SOAPAction` identifier.
    pub action: String,
}

/// Static operation → [`MethodDescriptor`] table.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: BTreeMap<Operation, MethodDescriptor>,
}

impl MethodTable {
    /// Parses a table from JSON keyed by operation wire name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTable` for malformed JSON, and
    /// `ConfigurationError::UnknownOperation` for a key outside the
    /// operation vocabulary.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let raw: BTreeMap<String, MethodDescriptor> =
            serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidTable {
                table: "method",
                message: e.to_string(),
            })?;

        let entries = raw
            .into_iter()
            .map(|(name, descriptor)| name.parse::<Operation>().map(|op| (op, descriptor)))
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }

    /// The table shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the bundled document is malformed.
    pub fn bundled() -> Result<Self, ConfigurationError> {
        Self::from_json_str(BUNDLED_METHODS)
    }

    /// Looks up the descriptor for `operation`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownMethod` if the table has no entry.
    pub fn resolve(&self, operation: Operation) -> Result<&MethodDescriptor, ConfigurationError> {
        self.entries
            .get(&operation)
            .ok_or_else(|| ConfigurationError::UnknownMethod {
                operation: operation.wire_name().to_string(),
            })
    }

    /// Looks up the descriptor for a free-form operation name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownOperation` if `name` is not in the
    /// vocabulary, or `UnknownMethod` if the table lacks it.
    pub fn resolve_name(&self, name: &str) -> Result<&MethodDescriptor, ConfigurationError> {
        self.resolve(name.parse()?)
    }
}
