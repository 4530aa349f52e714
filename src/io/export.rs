//! Export enriched records (CSV) and analysis reports (JSON).
//!
//! The CSV is the time-series view: one row per enriched record, easy to load
//! into spreadsheets or plotting scripts. JSON reports serialize non-finite
//! statistics (NaN) as `null`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{EnrichedRecord, RecordSet, weekday_name};
use crate::error::AppError;

/// CSV row shape for the enriched-records export.
#[derive(Debug, Serialize)]
struct EnrichedRow<'a> {
    timestamp_utc: String,
    timestamp_local: String,
    hour: u32,
    day_of_week: &'a str,
    day_type: &'a str,
    ping_ms: f64,
    download_mbps: f64,
    upload_mbps: f64,
}

impl<'a> From<&'a EnrichedRecord> for EnrichedRow<'a> {
    fn from(r: &'a EnrichedRecord) -> Self {
        let rec = r.record();
        Self {
            timestamp_utc: r.timestamp_utc().to_rfc3339(),
            timestamp_local: r.timestamp_local().to_rfc3339(),
            hour: r.hour_of_day(),
            day_of_week: weekday_name(r.day_of_week()),
            day_type: r.day_type().as_str(),
            ping_ms: rec.ping_ms,
            download_mbps: rec.download_mbps,
            upload_mbps: rec.upload_mbps,
        }
    }
}

/// Write enriched records to `writer` as CSV (header always present).
pub fn write_records_csv<W: Write>(writer: W, set: &RecordSet) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if set.is_empty() {
        // serialize() only emits the header with the first row
        wtr.write_record([
            "timestamp_utc",
            "timestamp_local",
            "hour",
            "day_of_week",
            "day_type",
            "ping_ms",
            "download_mbps",
            "upload_mbps",
        ])?;
    }
    for r in set {
        wtr.serialize(EnrichedRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write enriched records to a CSV file.
pub fn export_records_csv(path: &Path, set: &RecordSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_records_csv(BufWriter::new(file), set)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Write any serializable report as pretty JSON.
pub fn export_report_json<T: Serialize>(path: &Path, report: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON '{}': {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    use crate::domain::CanonicalRecord;
    use crate::stats::describe;
    use crate::temporal::{TargetZone, enrich};

    fn sample_set() -> RecordSet {
        let rec = CanonicalRecord {
            timestamp_utc: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            ping_ms: 4.5,
            download_mbps: 88.25,
            upload_mbps: 41.0,
        };
        enrich(&[rec], &TargetZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap()))
    }

    #[test]
    fn csv_export_has_header_and_local_fields() {
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &sample_set()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp_utc,timestamp_local,hour,day_of_week,day_type,ping_ms,download_mbps,upload_mbps"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2025-01-01T00:00:00+00:00,2025-01-01T09:00:00+09:00,9,Wednesday,Weekday,4.5,88.25,41.0"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_export_of_empty_set_is_header_only() {
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &RecordSet::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn json_export_writes_nan_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_report_json(&path, &describe(&RecordSet::default())).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["download_mbps"]["count"], 0);
        assert!(value["download_mbps"]["mean"].is_null());
    }

    #[test]
    fn export_to_missing_directory_is_runtime_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        let err = export_records_csv(&path, &sample_set()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
