//! Reporting: assemble analysis results and format them for the terminal.
//!
//! `AnalysisReport` is the single serializable result of a `stats` run; the
//! JSON export writes it as-is. Comparison commands report a `Comparison`
//! alongside a smaller header. Text formatting lives in `format`.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::domain::{AnalysisConfig, DayType, Metric, RecordSet, WEEKDAYS, weekday_name};
use crate::stats::{
    AggregateStats, Comparison, CorrelationMatrix, GroupMeans, Histogram, IntervalMean,
    by_day_of_week, by_day_type_hour, by_hour, correlation_matrix, describe, histogram, reindex,
    slowest_intervals,
};
use crate::window::{CutoverPartition, RecentVsHistorical};

pub mod format;

pub use format::*;

/// Row counts and span of the analysed data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub source: String,
    pub zone: String,
    pub rows_read: usize,
    pub rows_rejected: usize,
    pub records: usize,
    pub first_local: Option<DateTime<FixedOffset>>,
    pub last_local: Option<DateTime<FixedOffset>>,
}

impl DatasetInfo {
    pub fn new(config: &AnalysisConfig, set: &RecordSet, rows_read: usize, rows_rejected: usize) -> Self {
        Self {
            source: config.source.key(),
            zone: config.zone.to_string(),
            rows_read,
            rows_rejected,
            records: set.len(),
            first_local: set.first().map(|r| r.timestamp_local()),
            last_local: set.last().map(|r| r.timestamp_local()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourRow {
    pub hour: u32,
    pub means: GroupMeans,
}

/// One day of the Monday..Sunday axis; `means` is `None` when there is no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayRow {
    pub day: &'static str,
    pub means: Option<GroupMeans>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTypeHourRow {
    pub day_type: DayType,
    pub hour: u32,
    pub means: GroupMeans,
}

/// Everything `speedstat stats` computes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub dataset: DatasetInfo,
    pub summary: AggregateStats,
    /// Observed hours only, ascending.
    pub hourly: Vec<HourRow>,
    pub by_day_of_week: Vec<DayRow>,
    /// Observed (day type, hour) pairs only, weekday rows first.
    pub by_day_type_hour: Vec<DayTypeHourRow>,
    pub correlation: CorrelationMatrix,
    pub histograms: Vec<Histogram>,
    pub slowest_intervals: Vec<IntervalMean>,
}

impl AnalysisReport {
    pub fn build(set: &RecordSet, dataset: DatasetInfo, config: &AnalysisConfig) -> Self {
        let mut hourly: Vec<HourRow> = by_hour(set)
            .into_iter()
            .map(|(hour, means)| HourRow { hour, means })
            .collect();
        hourly.sort_by_key(|r| r.hour);

        let by_day_of_week = reindex(&by_day_of_week(set), WEEKDAYS)
            .into_iter()
            .map(|(day, means)| DayRow {
                day: weekday_name(day),
                means,
            })
            .collect();

        let mut by_day_type_hour: Vec<DayTypeHourRow> = by_day_type_hour(set)
            .into_iter()
            .map(|((day_type, hour), means)| DayTypeHourRow { day_type, hour, means })
            .collect();
        by_day_type_hour.sort_by_key(|r| (r.day_type, r.hour));

        Self {
            dataset,
            summary: describe(set),
            hourly,
            by_day_of_week,
            by_day_type_hour,
            correlation: correlation_matrix(set),
            histograms: Metric::ALL
                .iter()
                .map(|&m| histogram(set, m, config.histogram_bins))
                .collect(),
            slowest_intervals: slowest_intervals(set, config.interval, config.top_n),
        }
    }
}

/// Result of `speedstat compare`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutoverReport {
    pub dataset: DatasetInfo,
    pub cutover: DateTime<FixedOffset>,
    pub before: usize,
    pub after: usize,
    pub comparison: Comparison,
}

impl CutoverReport {
    pub fn build(partition: &CutoverPartition, dataset: DatasetInfo) -> Self {
        Self {
            dataset,
            cutover: partition.cutover,
            before: partition.before.len(),
            after: partition.after.len(),
            comparison: partition.compare(),
        }
    }
}

/// Result of one `speedstat realtime` evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtimeReport {
    pub dataset: DatasetInfo,
    pub window_start: DateTime<FixedOffset>,
    pub window_end: DateTime<FixedOffset>,
    pub weekday: &'static str,
    /// Clock-time slot matched against history, `HH:MM:SS`.
    pub slot: (String, String),
    pub crosses_midnight: bool,
    pub recent: usize,
    pub historical: usize,
    pub comparison: Comparison,
}

impl RealtimeReport {
    pub fn build(split: &RecentVsHistorical, dataset: DatasetInfo) -> Self {
        let w = &split.window;
        Self {
            dataset,
            window_start: w.start,
            window_end: w.end,
            weekday: weekday_name(w.weekday),
            slot: (w.start_time.to_string(), w.end_time.to_string()),
            crosses_midnight: w.crosses_midnight(),
            recent: split.recent.len(),
            historical: split.historical.len(),
            comparison: split.compare(),
        }
    }
}
