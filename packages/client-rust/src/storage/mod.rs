//! Persistence of logged exchanges.
//!
//! - [`StorageSink`]: the trait the response service writes through
//! - [`FsStorageSink`]: plain files on disk
//! - [`NullStorageSink`]: discards everything

pub mod fs;
pub mod null;
pub mod sink;

pub use fs::FsStorageSink;
pub use null::NullStorageSink;
pub use sink::{default_dir, resolve_dir, PersistenceError, StorageSink};
