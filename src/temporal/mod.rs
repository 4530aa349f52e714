//! Temporal enrichment: UTC instants → local calendar features.
//!
//! - target zone parsing + conversion (`zone`)
//! - record enrichment (`enrich`)

pub mod enrich;
pub mod zone;

pub use enrich::*;
pub use zone::*;
