//! NF-e client — response classification with exchange persistence, schema
//! validation, and the storage sinks they write through.

pub mod client;
pub mod config;
pub mod service;
pub mod storage;
pub mod telemetry;
pub mod validation;

pub use client::NfeClient;
pub use config::{load_environment, parse_environment, ConfigError, ValidationConfig};
pub use service::{ResponseError, ResponseService};
pub use storage::{FsStorageSink, NullStorageSink, PersistenceError, StorageSink};
pub use validation::{
    DirSchemaSource, InMemorySchemaSource, SchemaSource, SchemaValidationService,
    ValidationOutcome, WellFormedValidator, XsdValidator,
};
