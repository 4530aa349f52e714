//! Two-partition comparisons.
//!
//! A comparison only happens when both sides have records. Otherwise the
//! result is `Comparison::Skipped` naming the empty side(s), which callers
//! surface as a notice rather than treating as a failure.

use serde::Serialize;

use crate::domain::RecordSet;
use crate::stats::delta::{DeltaResult, mean_deltas};
use crate::stats::describe::{AggregateStats, describe};
use crate::window::{CutoverPartition, EmptyPartition, PartitionSide, RecentVsHistorical};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub baseline_side: PartitionSide,
    pub current_side: PartitionSide,
    pub baseline: AggregateStats,
    pub current: AggregateStats,
    pub deltas: Vec<DeltaResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Comparison {
    Compared(PeriodComparison),
    Skipped(EmptyPartition),
}

impl Comparison {
    pub fn compared(&self) -> Option<&PeriodComparison> {
        match self {
            Comparison::Compared(c) => Some(c),
            Comparison::Skipped(_) => None,
        }
    }
}

/// Describe both sides and compute mean deltas from `baseline` to `current`.
pub fn compare_sets(
    baseline: (PartitionSide, &RecordSet),
    current: (PartitionSide, &RecordSet),
) -> Comparison {
    let empty: Vec<PartitionSide> = [baseline, current]
        .iter()
        .filter(|(_, set)| set.is_empty())
        .map(|(side, _)| *side)
        .collect();
    if !empty.is_empty() {
        return Comparison::Skipped(EmptyPartition { sides: empty });
    }

    let base_stats = describe(baseline.1);
    let cur_stats = describe(current.1);
    Comparison::Compared(PeriodComparison {
        baseline_side: baseline.0,
        current_side: current.0,
        deltas: mean_deltas(&base_stats, &cur_stats),
        baseline: base_stats,
        current: cur_stats,
    })
}

impl CutoverPartition {
    /// `before` is the baseline, `after` the current period.
    pub fn compare(&self) -> Comparison {
        compare_sets(
            (PartitionSide::Before, &self.before),
            (PartitionSide::After, &self.after),
        )
    }
}

impl RecentVsHistorical {
    /// `historical` is the baseline, `recent` the current period.
    pub fn compare(&self) -> Comparison {
        compare_sets(
            (PartitionSide::Historical, &self.historical),
            (PartitionSide::Recent, &self.recent),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    use crate::domain::{CanonicalRecord, Metric};
    use crate::temporal::{TargetZone, enrich};
    use crate::window::{RollingWindow, partition_by_cutover, partition_recent_vs_historical};

    fn rec(day: u32, hour: u32, min: u32, download: f64) -> CanonicalRecord {
        CanonicalRecord {
            timestamp_utc: Utc.with_ymd_and_hms(2025, 1, day, hour, min, 0).unwrap(),
            ping_ms: 20.0,
            download_mbps: download,
            upload_mbps: 10.0,
        }
    }

    fn utc_zone() -> TargetZone {
        TargetZone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn cutover_comparison_reports_mean_deltas() {
        let set = enrich(
            &[rec(1, 0, 0, 100.0), rec(2, 0, 0, 100.0), rec(3, 0, 0, 150.0)],
            &utc_zone(),
        );
        let cutover = Utc
            .with_ymd_and_hms(2025, 1, 3, 0, 0, 0)
            .unwrap()
            .fixed_offset();
        let comparison = partition_by_cutover(&set, cutover).compare();
        let c = comparison.compared().expect("both sides populated");
        assert_eq!(c.baseline_side, PartitionSide::Before);
        assert_eq!(c.baseline.count(), 2);
        assert_eq!(c.current.count(), 1);
        let download = c.deltas.iter().find(|d| d.metric == Metric::DownloadMbps).unwrap();
        assert_eq!(download.percent_change, 50.0);
        let ping = c.deltas.iter().find(|d| d.metric == Metric::PingMs).unwrap();
        assert_eq!(ping.percent_change, 0.0);
    }

    #[test]
    fn empty_side_is_skipped_not_failed() {
        let set = enrich(&[rec(1, 0, 0, 100.0)], &utc_zone());
        let cutover = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap().fixed_offset();
        let comparison = partition_by_cutover(&set, cutover).compare();
        assert_eq!(
            comparison,
            Comparison::Skipped(EmptyPartition {
                sides: vec![PartitionSide::Before]
            })
        );
        assert!(comparison.compared().is_none());
    }

    #[test]
    fn recent_vs_historical_uses_history_as_baseline() {
        // Jan 1 and Jan 8 2025 are both Wednesdays.
        let set = enrich(&[rec(1, 12, 10, 80.0), rec(8, 12, 10, 40.0)], &utc_zone());
        let now = Utc.with_ymd_and_hms(2025, 1, 8, 12, 30, 0).unwrap();
        let window = RollingWindow::minutes(30).unwrap();
        let comparison = partition_recent_vs_historical(&set, now, window, &utc_zone())
            .unwrap()
            .compare();
        let c = comparison.compared().expect("both sides populated");
        assert_eq!(c.baseline_side, PartitionSide::Historical);
        assert_eq!(c.current_side, PartitionSide::Recent);
        let download = c.deltas.iter().find(|d| d.metric == Metric::DownloadMbps).unwrap();
        assert_eq!(download.percent_change, -50.0);
    }

    #[test]
    fn both_sides_empty_names_both() {
        let comparison = compare_sets(
            (PartitionSide::Historical, &RecordSet::default()),
            (PartitionSide::Recent, &RecordSet::default()),
        );
        match comparison {
            Comparison::Skipped(e) => {
                assert_eq!(e.sides, vec![PartitionSide::Historical, PartitionSide::Recent])
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }
}
