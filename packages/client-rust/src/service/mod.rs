//! Response handling services.

pub mod response;

pub use response::{ResponseError, ResponseService};
