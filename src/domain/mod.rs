//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - canonical schema fields and metrics (`CanonicalField`, `Metric`)
//! - the record types produced by normalization and enrichment
//!   (`CanonicalRecord`, `EnrichedRecord`, `RecordSet`)
//! - calendar helpers (`DayType`, `LocalTimeOfDay`, weekday names)
//! - the resolved run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
