//! Aggregation over enriched record sets.
//!
//! - whole-set descriptive statistics (`describe`)
//! - grouped means by hour / weekday / day type × hour (`group`)
//! - relative deltas between two aggregates (`delta`)
//! - two-partition comparisons with an empty-partition outcome (`compare`)
//! - correlation, histograms and slowest fixed-width intervals
//!   (`correlation`, `distribution`, `intervals`)
//!
//! Nothing here fails on empty input: empty sets produce zero counts and NaN
//! statistics, and it is up to presentation to decide what is meaningful.

pub mod compare;
pub mod correlation;
pub mod delta;
pub mod describe;
pub mod distribution;
pub mod group;
pub mod intervals;

pub use compare::*;
pub use correlation::*;
pub use delta::*;
pub use describe::*;
pub use distribution::*;
pub use group::*;
pub use intervals::*;
