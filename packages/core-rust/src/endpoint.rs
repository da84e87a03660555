//! Webservice endpoint resolution.
//!
//! An endpoint is addressed by a two-level key: the parent key selects the
//! authority and environment (`NFe_AN_H`, `NFe_SP_P`, ...), the child key
//! selects operation and version (`NFEAutorizacao_4.00`).

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::config::EnvironmentConfig;
use crate::error::ConfigurationError;
use crate::operation::Operation;

const BUNDLED_ENDPOINTS: &str = include_str!("../tables/endpoints.json");

/// Two-level lookup key into the [`EndpointTable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    /// Scope/environment key, e.g. `NFe_AN_H` or `NFe_SP_P`.
    pub parent: String,
    /// Operation/version key, e.g. `NFEAutorizacao_4.00`.
    pub child: String,
}

/// Builds the endpoint key for an operation.
///
/// National-scope operations are served by the national environment
/// (`AN`); all others by the configured state. An empty `version` falls back
/// to the configured default document version.
#[must_use]
pub fn resolve_key(
    config: &EnvironmentConfig,
    operation: Operation,
    national_scope: bool,
    version: &str,
) -> EndpointKey {
    let suffix = config.environment.scope_suffix();
    let version = if version.trim().is_empty() {
        config.default_version.as_str()
    } else {
        version
    };

    let parent = if national_scope {
        format!("NFe_AN_{suffix}")
    } else {
        format!("NFe_{}_{suffix}", config.state_code)
    };

    EndpointKey {
        parent,
        child: format!("{}_{version}", operation.wire_name()),
    }
}

/// Static table of webservice URLs, keyed by [`EndpointKey`].
///
/// Immutable once loaded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct EndpointTable {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl EndpointTable {
    /// Parses a table from its JSON form: `{ parent: { child: url } }`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTable` if the document does not
    /// have that shape.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidTable {
            table: "endpoint",
            message: e.to_string(),
        })
    }

    /// The table shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTable` if the bundled document is
    /// malformed.
    pub fn bundled() -> Result<Self, ConfigurationError> {
        Self::from_json_str(BUNDLED_ENDPOINTS)
    }

    /// Looks up the URL for an already-built key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnresolvedEndpoint` if either level of
    /// the key is missing.
    pub fn get(&self, key: &EndpointKey) -> Result<&str, ConfigurationError> {
        self.entries
            .get(&key.parent)
            .and_then(|children| children.get(&key.child))
            .map(String::as_str)
            .ok_or_else(|| ConfigurationError::UnresolvedEndpoint {
                parent_key: key.parent.clone(),
                child_key: key.child.clone(),
            })
    }

    /// Resolves the webservice URL for an operation in the configured
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnresolvedEndpoint`, naming the child
    /// key, when the table has no entry for the resolved key.
    pub fn resolve_url(
        &self,
        config: &EnvironmentConfig,
        operation: Operation,
        national_scope: bool,
        version: &str,
    ) -> Result<&str, ConfigurationError> {
        let key = resolve_key(config, operation, national_scope, version);
        let url = self.get(&key)?;
        debug!(
            operation = %operation,
            parent_key = %key.parent,
            child_key = %key.child,
            url,
            "resolved webservice endpoint"
        );
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
