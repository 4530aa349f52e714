//! `speedtest-stats` library crate.
//!
//! The binary (`speedstat`) is a thin wrapper around this library so that:
//!
//! - the data-prep and comparison engine is testable without spawning processes
//! - the engine can be reused by other front-ends (dashboards, notebooks, etc.)
//!
//! Data flow: `io` (load + normalize) -> `temporal` (enrich) -> `window`
//! (partition) -> `stats` (aggregate, delta) -> `report` (present/export).

pub mod app;
pub mod cli;
pub mod clock;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod stats;
pub mod temporal;
pub mod window;
