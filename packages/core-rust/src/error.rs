//! Error types shared across the core.

/// Static configuration could not answer a lookup.
///
/// Always fatal to the current request; nothing in the core retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The name is not part of the closed operation vocabulary.
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },
    /// The method table has no descriptor for the operation.
    #[error("no SOAP method configured for operation: {operation}")]
    UnknownMethod { operation: String },
    /// The endpoint table has no URL for the key pair.
    #[error("no webservice url configured for {child_key} under {parent_key}")]
    UnresolvedEndpoint { parent_key: String, child_key: String },
    /// A table document could not be loaded.
    #[error("invalid {table} table: {message}")]
    InvalidTable { table: &'static str, message: String },
}

/// The remote service answered, but refused the document.
///
/// Displays the rejection reason verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct RejectionError {
    pub reason: String,
}

/// Failure converting between XML text and the generic tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("malformed XML at byte {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("failed to serialize XML: {0}")]
    Serialize(String),
}
