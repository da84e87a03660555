//! Client configuration: environment settings loading and validation knobs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nfe_core::EnvironmentConfig;

/// Settings for [`SchemaValidationService`](crate::validation::SchemaValidationService).
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Upper bound for one validation run (schema lookup included).
    pub timeout: Duration,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Errors loading the environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid environment config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parses an environment configuration document (camelCase JSON). Missing
/// fields take their defaults.
///
/// # Errors
///
/// Returns `ConfigError::Parse` for malformed JSON or invalid values.
pub fn parse_environment(json: &str) -> Result<EnvironmentConfig, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses an environment configuration file.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read, or
/// `ConfigError::Parse` if its content is invalid.
pub fn load_environment(path: &Path) -> Result<EnvironmentConfig, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_environment(&json)
}
