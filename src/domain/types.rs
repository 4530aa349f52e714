//! Shared domain types.
//!
//! Records are immutable once built. Enriched records only come out of
//! `temporal::enrich`, so their derived calendar fields always agree with the
//! timestamp and the configured zone.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::temporal::TargetZone;

/// A field of the canonical record schema.
///
/// Source files name these columns in many different ways; the alias table in
/// `io::ingest` maps source headers onto these fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Timestamp,
    PingMs,
    DownloadMbps,
    UploadMbps,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::Timestamp,
        CanonicalField::PingMs,
        CanonicalField::DownloadMbps,
        CanonicalField::UploadMbps,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Timestamp => "timestamp",
            CanonicalField::PingMs => "ping_ms",
            CanonicalField::DownloadMbps => "download_mbps",
            CanonicalField::UploadMbps => "upload_mbps",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three measured quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PingMs,
    DownloadMbps,
    UploadMbps,
}

impl Metric {
    /// Presentation order used by every table and export.
    pub const ALL: [Metric; 3] = [Metric::PingMs, Metric::DownloadMbps, Metric::UploadMbps];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::PingMs => "ping_ms",
            Metric::DownloadMbps => "download_mbps",
            Metric::UploadMbps => "upload_mbps",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::PingMs => "Ping",
            Metric::DownloadMbps => "Download",
            Metric::UploadMbps => "Upload",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::PingMs => "ms",
            Metric::DownloadMbps | Metric::UploadMbps => "Mbps",
        }
    }

    /// Direction metadata for delta displays: a rising ping is a regression,
    /// a rising throughput is an improvement.
    pub fn lower_is_better(self) -> bool {
        matches!(self, Metric::PingMs)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cleaned measurement. All numeric fields are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalRecord {
    pub timestamp_utc: DateTime<Utc>,
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

impl CanonicalRecord {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::PingMs => self.ping_ms,
            Metric::DownloadMbps => self.download_mbps,
            Metric::UploadMbps => self.upload_mbps,
        }
    }
}

/// Weekday (Mon–Fri) vs weekend (Sat–Sun), judged on the local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Weekday => "Weekday",
            DayType::Weekend => "Weekend",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical Monday..Sunday axis.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name (`Monday`, ...).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Wall-clock time of day with no date attached.
///
/// Used for "same slot on a past weekday" matching, where two instants on
/// different dates must compare by clock time alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalTimeOfDay(NaiveTime);

impl LocalTimeOfDay {
    pub fn of(ts: &DateTime<FixedOffset>) -> Self {
        Self(ts.time())
    }
}

impl fmt::Display for LocalTimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

/// A canonical record plus calendar features derived in the target zone.
///
/// Fields are private: the only constructor is `temporal::enrich`, which keeps
/// the derived values a pure function of `(timestamp_utc, zone)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichedRecord {
    record: CanonicalRecord,
    timestamp_local: DateTime<FixedOffset>,
    hour_of_day: u32,
    day_of_week: Weekday,
    day_type: DayType,
}

impl EnrichedRecord {
    pub(crate) fn new(record: CanonicalRecord, timestamp_local: DateTime<FixedOffset>) -> Self {
        let day_of_week = timestamp_local.weekday();
        Self {
            record,
            timestamp_local,
            hour_of_day: timestamp_local.hour(),
            day_of_week,
            day_type: DayType::from_weekday(day_of_week),
        }
    }

    pub fn record(&self) -> &CanonicalRecord {
        &self.record
    }

    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        self.record.timestamp_utc
    }

    pub fn timestamp_local(&self) -> DateTime<FixedOffset> {
        self.timestamp_local
    }

    pub fn hour_of_day(&self) -> u32 {
        self.hour_of_day
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    pub fn day_type(&self) -> DayType {
        self.day_type
    }

    pub fn time_of_day(&self) -> LocalTimeOfDay {
        LocalTimeOfDay::of(&self.timestamp_local)
    }

    pub fn value(&self, metric: Metric) -> f64 {
        self.record.value(metric)
    }
}

/// Enriched records ordered by `timestamp_utc` ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<EnrichedRecord>,
}

impl RecordSet {
    /// Build a set, sorting by UTC instant (stable for equal instants).
    pub fn from_records(mut records: Vec<EnrichedRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp_utc());
        Self { records }
    }

    /// Keep the records matching `pred`, preserving order.
    pub fn filter(&self, pred: impl Fn(&EnrichedRecord) -> bool) -> Self {
        Self {
            records: self.records.iter().filter(|&r| pred(r)).copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedRecord> {
        self.records.iter()
    }

    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }

    pub fn first(&self) -> Option<&EnrichedRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&EnrichedRecord> {
        self.records.last()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a EnrichedRecord;
    type IntoIter = std::slice::Iter<'a, EnrichedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Where the raw batch comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File(PathBuf),
    /// CSV export URL of a remote spreadsheet.
    Sheet(String),
}

impl SourceSpec {
    /// Stable key for the load cache and log lines.
    pub fn key(&self) -> String {
        match self {
            SourceSpec::File(path) => format!("file:{}", path.display()),
            SourceSpec::Sheet(url) => format!("sheet:{url}"),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags, with environment defaults (see `app::config`).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub source: SourceSpec,
    pub zone: TargetZone,
    /// Optional JSON alias-table override.
    pub aliases_path: Option<PathBuf>,
    pub cache_ttl: Duration,

    /// Histogram bin count for distribution summaries.
    pub histogram_bins: usize,
    /// Bucket width for the slowest-interval scan.
    pub interval: Duration,
    /// How many slowest intervals to report.
    pub top_n: usize,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}
