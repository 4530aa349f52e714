//! Raw batch reading and normalization.
//!
//! This module turns a heterogeneous speedtest log into a clean set of
//! `CanonicalRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required fields, resolved once per batch through the
//!   alias table (every missing field is reported together)
//! - **Row-level validation** (reject bad rows, never repair or default them)
//! - **Pure**: no logging here, rejections are returned to the caller
//! - **Separation of concerns**: no timezone or aggregation logic here

use std::collections::HashMap;
use std::io::Read;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::domain::{CanonicalField, CanonicalRecord};
use crate::error::PrepError;
use crate::io::aliases::ColumnAliasMap;

/// One untyped source row: header name → cell text.
pub type RawRecord = HashMap<String, String>;

/// A raw source batch: the header row plus data rows keyed by header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatch {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawBatch {
    /// Build a batch from positional rows (missing trailing cells are omitted).
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|cells| {
                headers
                    .iter()
                    .cloned()
                    .zip(cells.into_iter().map(Into::into))
                    .collect::<RawRecord>()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a delimited source into a raw batch.
///
/// Rows are read as bytes and decoded lossily, so a stray non-UTF-8 byte
/// surfaces as an unparseable cell (and a rejected row) rather than aborting
/// the whole load.
pub fn read_raw_batch<R: Read>(reader: R, source_name: &str) -> Result<RawBatch, PrepError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| PrepError::unreadable(source_name, format!("failed to read headers: {e}")))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result.map_err(|e| PrepError::unreadable(source_name, e))?;
        let row: RawRecord = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|cell| String::from_utf8_lossy(cell).into_owned()))
            .collect();
        rows.push(row);
    }

    Ok(RawBatch { headers, rows })
}

/// A row that did not make it into the canonical set.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// 1-based line in the source, counting the header as line 1.
    pub line: usize,
    pub reason: String,
}

/// Normalizer output: canonical records (ordered by UTC instant) plus
/// per-row rejections.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub records: Vec<CanonicalRecord>,
    pub rejections: Vec<RowRejection>,
    pub rows_read: usize,
}

impl NormalizedBatch {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }
}

/// Source header chosen for a canonical field, with its unit factor.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedColumn {
    header: String,
    scale: f64,
}

#[derive(Debug, Clone)]
struct ResolvedColumns {
    timestamp: ResolvedColumn,
    ping_ms: ResolvedColumn,
    download_mbps: ResolvedColumn,
    upload_mbps: ResolvedColumn,
}

/// Normalize a raw batch into canonical records.
///
/// Fails with `SchemaMismatch` before touching any row if a canonical field
/// has no matching column, and with `EmptyAfterCleaning` if every row was
/// rejected. Otherwise `records.len() + rejected() == rows_read`.
pub fn normalize(batch: &RawBatch, aliases: &ColumnAliasMap) -> Result<NormalizedBatch, PrepError> {
    let columns = resolve_columns(&batch.headers, aliases)?;

    let mut records = Vec::with_capacity(batch.rows.len());
    let mut rejections = Vec::new();

    for (idx, row) in batch.rows.iter().enumerate() {
        // +2: header is line 1, data starts at line 2.
        let line = idx + 2;
        match parse_row(row, &columns) {
            Ok(record) => records.push(record),
            Err(reason) => rejections.push(RowRejection { line, reason }),
        }
    }

    if records.is_empty() {
        return Err(PrepError::EmptyAfterCleaning {
            rows: batch.rows.len(),
            rejected: rejections.len(),
        });
    }

    records.sort_by_key(|r| r.timestamp_utc);

    Ok(NormalizedBatch {
        records,
        rejections,
        rows_read: batch.rows.len(),
    })
}

fn resolve_columns(headers: &[String], aliases: &ColumnAliasMap) -> Result<ResolvedColumns, PrepError> {
    let header_map: HashMap<String, &str> = headers
        .iter()
        .map(|h| (normalize_header_name(h), h.as_str()))
        .collect();

    let mut missing = Vec::new();
    let mut resolve = |field: CanonicalField| -> Option<ResolvedColumn> {
        let found = aliases.aliases(field).iter().find_map(|alias| {
            header_map
                .get(&normalize_header_name(&alias.name))
                .map(|header| ResolvedColumn {
                    header: (*header).to_string(),
                    scale: alias.scale,
                })
        });
        if found.is_none() {
            missing.push(field);
        }
        found
    };

    let timestamp = resolve(CanonicalField::Timestamp);
    let ping_ms = resolve(CanonicalField::PingMs);
    let download_mbps = resolve(CanonicalField::DownloadMbps);
    let upload_mbps = resolve(CanonicalField::UploadMbps);

    match (timestamp, ping_ms, download_mbps, upload_mbps) {
        (Some(timestamp), Some(ping_ms), Some(download_mbps), Some(upload_mbps)) => Ok(ResolvedColumns {
            timestamp,
            ping_ms,
            download_mbps,
            upload_mbps,
        }),
        _ => Err(PrepError::SchemaMismatch { missing }),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(row: &RawRecord, columns: &ResolvedColumns) -> Result<CanonicalRecord, String> {
    let raw_ts = get_required(row, &columns.timestamp)?;
    let timestamp_utc =
        parse_timestamp(raw_ts).ok_or_else(|| format!("Invalid timestamp '{raw_ts}'."))?;

    Ok(CanonicalRecord {
        timestamp_utc,
        ping_ms: parse_measurement(row, &columns.ping_ms)?,
        download_mbps: parse_measurement(row, &columns.download_mbps)?,
        upload_mbps: parse_measurement(row, &columns.upload_mbps)?,
    })
}

fn get_required<'a>(row: &'a RawRecord, column: &ResolvedColumn) -> Result<&'a str, String> {
    row.get(&column.header)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value for `{}`.", column.header))
}

fn parse_measurement(row: &RawRecord, column: &ResolvedColumn) -> Result<f64, String> {
    let raw = get_required(row, column)?;
    let value = parse_number(raw)
        .ok_or_else(|| format!("Non-numeric `{}` value '{raw}'.", column.header))?
        * column.scale;
    if value < 0.0 {
        return Err(format!("Negative `{}` value '{raw}'.", column.header));
    }
    Ok(value)
}

/// Parse a number, tolerating `,` thousands separators (`1,234.5`).
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse a source timestamp as a UTC instant.
///
/// A trailing `Z` is stripped and the remainder read as UTC wall-clock time.
/// Strings with an explicit numeric offset are converted to UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    const FMTS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let s = s.trim();
    let wall_clock = s.strip_suffix(|c: char| c == 'Z' || c == 'z').unwrap_or(s);
    for fmt in FMTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(wall_clock, fmt) {
            return Some(naive.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::io::aliases::ColumnAlias;

    const HEADERS: [&str; 5] = ["timestamp (UTC)", "ping (ms)", "download (Mbps)", "upload (Mbps)", "comment"];

    fn batch(rows: Vec<[&str; 5]>) -> RawBatch {
        RawBatch::from_rows(HEADERS, rows)
    }

    #[test]
    fn rejects_unparseable_row_and_keeps_the_rest() {
        let input = batch(vec![
            ["2025-01-01T00:00:00Z", "10", "50", "20", ""],
            ["2025-01-01T00:05:00Z", "bad", "51", "21", ""],
        ]);
        let out = normalize(&input, &ColumnAliasMap::default()).unwrap();

        assert_eq!(out.records.len(), 1);
        assert_eq!(out.rejected(), 1);
        assert_eq!(out.records.len() + out.rejected(), input.len());
        assert_eq!(out.rejections[0].line, 3);

        let r = &out.records[0];
        assert_eq!(r.timestamp_utc, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!((r.ping_ms, r.download_mbps, r.upload_mbps), (10.0, 50.0, 20.0));
    }

    #[test]
    fn schema_mismatch_reports_all_missing_fields() {
        let input = RawBatch::from_rows(["timestamp (UTC)", "download (Mbps)"], vec![["2025-01-01T00:00:00Z", "50"]]);
        let err = normalize(&input, &ColumnAliasMap::default()).unwrap_err();
        assert_eq!(
            err,
            PrepError::SchemaMismatch {
                missing: vec![CanonicalField::PingMs, CanonicalField::UploadMbps]
            }
        );
    }

    #[test]
    fn all_rows_bad_is_empty_after_cleaning_not_schema_mismatch() {
        let input = batch(vec![
            ["2025-01-01T00:00:00Z", "", "50", "20", ""],
            ["not a date", "10", "50", "20", ""],
        ]);
        let err = normalize(&input, &ColumnAliasMap::default()).unwrap_err();
        assert_eq!(err, PrepError::EmptyAfterCleaning { rows: 2, rejected: 2 });
    }

    #[test]
    fn bps_columns_are_scaled_to_mbps() {
        let input = RawBatch::from_rows(
            ["timestamp (in UTC)", "ping (ms)", "download (bps)", "upload (bps)", "comment"],
            vec![["2025-08-22T00:05:00Z", "4.5", "95,000,000", "25000000", "note"]],
        );
        let out = normalize(&input, &ColumnAliasMap::default()).unwrap();
        let r = &out.records[0];
        assert!((r.download_mbps - 95.0).abs() < 1e-9);
        assert!((r.upload_mbps - 25.0).abs() < 1e-9);
    }

    #[test]
    fn header_matching_ignores_case_whitespace_and_bom() {
        let input = RawBatch::from_rows(
            ["\u{feff}Timestamp (utc) ", "PING (MS)", " Download (Mbps)", "upload (mbps)"],
            vec![["2025-01-01 12:30:00", "1", "2", "3"]],
        );
        let out = normalize(&input, &ColumnAliasMap::default()).unwrap();
        assert_eq!(out.records[0].timestamp_utc, Utc.with_ymd_and_hms(2025, 1, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn custom_alias_map_is_honored() {
        let aliases = ColumnAliasMap::default().with_field(CanonicalField::PingMs, vec![ColumnAlias::new("latency")]);
        let input = RawBatch::from_rows(
            ["timestamp", "latency", "download (Mbps)", "upload (Mbps)"],
            vec![["2025-01-01T00:00:00Z", "7", "2", "3"]],
        );
        let out = normalize(&input, &aliases).unwrap();
        assert_eq!(out.records[0].ping_ms, 7.0);
    }

    #[test]
    fn negative_and_non_finite_values_are_rejected() {
        let input = batch(vec![
            ["2025-01-01T00:00:00Z", "-1", "50", "20", ""],
            ["2025-01-01T00:05:00Z", "1", "inf", "20", ""],
            ["2025-01-01T00:10:00Z", "1", "50", "20", ""],
        ]);
        let out = normalize(&input, &ColumnAliasMap::default()).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.rejected(), 2);
    }

    #[test]
    fn records_come_out_sorted_by_instant() {
        let input = batch(vec![
            ["2025-01-02T00:00:00Z", "1", "1", "1", ""],
            ["2025-01-01T00:00:00Z", "2", "2", "2", ""],
        ]);
        let out = normalize(&input, &ColumnAliasMap::default()).unwrap();
        assert_eq!(out.records[0].ping_ms, 2.0);
    }

    #[test]
    fn parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 8, 22, 0, 5, 0).unwrap();
        assert_eq!(parse_timestamp("2025-08-22T00:05:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-08-22T00:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-08-22 00:05"), Some(expected));
        assert_eq!(parse_timestamp("2025-08-22T09:05:00+09:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn read_raw_batch_keeps_rows_keyed_by_header() {
        let csv = "timestamp (UTC),ping (ms),download (Mbps),upload (Mbps),comment\n\
                   2025-01-01T00:00:00Z,10,\"1,050.5\",20,\n\
                   2025-01-01T00:05:00Z,11,51\n";
        let batch = read_raw_batch(csv.as_bytes(), "inline").unwrap();
        assert_eq!(batch.headers.len(), 5);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.rows[0]["download (Mbps)"], "1,050.5");
        assert!(!batch.rows[1].contains_key("upload (Mbps)"));

        let out = normalize(&batch, &ColumnAliasMap::default()).unwrap();
        assert_eq!(out.records.len(), 1);
        assert!((out.records[0].download_mbps - 1050.5).abs() < 1e-9);
        assert_eq!(out.rejected(), 1);
    }
}
