//! Input/output helpers.
//!
//! - column alias table (`aliases`)
//! - raw sources: local CSV file, remote sheet export (`source`)
//! - TTL cache in front of source loads (`cache`)
//! - CSV reading + normalization (`ingest`)
//! - result exports (CSV/JSON) (`export`)

pub mod aliases;
pub mod cache;
pub mod export;
pub mod ingest;
pub mod source;

pub use aliases::*;
pub use cache::*;
pub use export::*;
pub use ingest::*;
pub use source::*;
