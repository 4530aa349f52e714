//! Comparison windows over an enriched record set.
//!
//! - fixed cutover instant: before vs after (`partition_by_cutover`)
//! - rolling recent window vs same-weekday/same-time-of-day history
//!   (`partition_recent_vs_historical`)
//!
//! Partitions may be empty; that is a normal outcome reported as
//! `EmptyPartition` by the comparison layer, never an error.

pub mod partition;

pub use partition::*;

use std::fmt;

use serde::Serialize;

/// Names one side of a two-way partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionSide {
    Before,
    After,
    Recent,
    Historical,
}

impl PartitionSide {
    pub fn as_str(self) -> &'static str {
        match self {
            PartitionSide::Before => "before",
            PartitionSide::After => "after",
            PartitionSide::Recent => "recent",
            PartitionSide::Historical => "historical",
        }
    }
}

impl fmt::Display for PartitionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or both sides of a requested comparison had no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyPartition {
    pub sides: Vec<PartitionSide>,
}

impl fmt::Display for EmptyPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sides.iter().map(|s| s.as_str()).collect();
        write!(f, "no records in the {} partition", names.join(" and "))
    }
}
