//! Fixed-width time buckets and the slowest ones among them.
//!
//! Buckets are aligned to the Unix epoch (a 15-minute width starts buckets at
//! :00, :15, :30, :45 UTC), and only buckets that contain records exist.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;

use crate::domain::RecordSet;
use crate::stats::group::{GroupMeans, MeanAccumulator};

pub const DEFAULT_INTERVAL_MINUTES: i64 = 15;
pub const DEFAULT_TOP_N: usize = 10;

/// Means of one non-empty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalMean {
    pub start_utc: DateTime<Utc>,
    /// Bucket start shown in the offset of the bucket's first record.
    pub start_local: DateTime<FixedOffset>,
    pub means: GroupMeans,
}

/// Bucket `set` into `width`-long intervals, ascending by start.
///
/// A non-positive width yields nothing.
pub fn resample(set: &RecordSet, width: Duration) -> Vec<IntervalMean> {
    let secs = width.num_seconds();
    if secs <= 0 {
        return Vec::new();
    }

    let mut buckets: BTreeMap<i64, (FixedOffset, MeanAccumulator)> = BTreeMap::new();
    for record in set {
        let start = record.timestamp_utc().timestamp().div_euclid(secs) * secs;
        buckets
            .entry(start)
            .or_insert_with(|| (*record.timestamp_local().offset(), MeanAccumulator::default()))
            .1
            .add(record);
    }

    buckets
        .into_iter()
        .filter_map(|(start, (offset, acc))| {
            let start_utc = DateTime::<Utc>::from_timestamp(start, 0)?;
            Some(IntervalMean {
                start_utc,
                start_local: start_utc.with_timezone(&offset),
                means: acc.finish(),
            })
        })
        .collect()
}

/// The `top_n` buckets with the lowest mean download, slowest first.
///
/// Ties keep chronological order.
pub fn slowest_intervals(set: &RecordSet, width: Duration, top_n: usize) -> Vec<IntervalMean> {
    let mut intervals = resample(set, width);
    intervals.sort_by(|a, b| {
        a.means
            .download_mbps
            .partial_cmp(&b.means.download_mbps)
            .unwrap_or(Ordering::Equal)
    });
    intervals.truncate(top_n);
    intervals
}
