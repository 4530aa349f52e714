//! Relative change between two aggregate scalars.

use serde::Serialize;

use crate::domain::Metric;
use crate::stats::describe::AggregateStats;

/// `(current − baseline) / baseline × 100`, or `0` when `baseline == 0`.
///
/// A zero baseline means "no prior signal", which this system reports as no
/// change. No rounding is applied here.
pub fn percent_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (current - baseline) / baseline * 100.0
}

/// A single metric's change between two aggregates.
///
/// Carries no notion of better or worse; see `Metric::lower_is_better`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaResult {
    pub metric: Metric,
    pub baseline_value: f64,
    pub current_value: f64,
    pub percent_change: f64,
}

impl DeltaResult {
    pub fn new(metric: Metric, baseline_value: f64, current_value: f64) -> Self {
        Self {
            metric,
            baseline_value,
            current_value,
            percent_change: percent_change(baseline_value, current_value),
        }
    }

    /// Delta of the means of `metric`.
    pub fn from_means(metric: Metric, baseline: &AggregateStats, current: &AggregateStats) -> Self {
        Self::new(metric, baseline.get(metric).mean, current.get(metric).mean)
    }
}

/// Mean deltas for every metric, in `Metric::ALL` order.
pub fn mean_deltas(baseline: &AggregateStats, current: &AggregateStats) -> Vec<DeltaResult> {
    Metric::ALL
        .iter()
        .map(|&m| DeltaResult::from_means(m, baseline, current))
        .collect()
}
