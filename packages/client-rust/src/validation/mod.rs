//! Schema validation of outbound payloads.
//!
//! 1. **Source** (`source`): fetch the XSD for an operation
//! 2. **Validator** (`validator`): run it against the document
//! 3. **Service** (`service`): timeout, error folding and message normalization

pub mod service;
pub mod source;
pub mod validator;

pub use service::{SchemaValidationService, ValidationOutcome, VALID_MESSAGE, WELL_FORMED_MESSAGE};
pub use source::{DirSchemaSource, InMemorySchemaSource, SchemaSource};
pub use validator::{ValidatorReport, WellFormedValidator, XsdValidator};
