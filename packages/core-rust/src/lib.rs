//! NF-e core — generic XML tree, deep key search, operation vocabulary,
//! endpoint/method tables, response classification and diagnostic
//! normalization.

pub mod classify;
pub mod config;
pub mod diagnostic;
pub mod endpoint;
pub mod error;
pub mod method;
pub mod operation;
pub mod tree;
pub mod xml;

pub use classify::{
    classify, classify_tree, extract_receipt, is_rejection, Classification, ClassifiedResponse,
    ProtocolEnvelope, Receipt,
};
pub use config::{Environment, EnvironmentConfig, DEFAULT_DOCUMENT_VERSION};
pub use endpoint::{resolve_key, EndpointKey, EndpointTable};
pub use error::{ConfigurationError, RejectionError, TreeError};
pub use method::{MethodDescriptor, MethodTable};
pub use operation::{log_file_name, log_file_name_for, Operation, Stage};
pub use tree::Node;
pub use xml::{to_tree, to_xml_text, MAX_DEPTH};
