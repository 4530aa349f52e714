//! Synthetic speedtest log generation.
//!
//! Produces rows in the raw source schema (`timestamp (UTC)`, `ping (ms)`,
//! `download (Mbps)`, `upload (Mbps)`, `comment`) so the output can be fed
//! straight back through `speedstat stats --file`.

use std::io::Write;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Header row of generated files.
pub const GENERATED_HEADERS: [&str; 5] = [
    "timestamp (UTC)",
    "ping (ms)",
    "download (Mbps)",
    "upload (Mbps)",
    "comment",
];

const PING_MEAN: f64 = 4.5;
const PING_STD_DEV: f64 = 1.5;
/// Chance of a network spike replacing the normal ping draw.
const OUTLIER_PING_CHANCE: f64 = 0.01;
const OUTLIER_PING_RANGE: (f64, f64) = (20.0, 150.0);
const DOWNLOAD_RANGE: (f64, f64) = (30.0, 95.0);
const UPLOAD_RANGE: (f64, f64) = (25.0, 70.0);

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub start: DateTime<Utc>,
    pub days: u32,
    pub interval_minutes: i64,
    /// Each step is jittered uniformly by ±this many seconds.
    pub jitter_secs: i64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2025, 8, 22, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            days: 30,
            interval_minutes: 5,
            jitter_secs: 60,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedRow {
    pub timestamp_utc: DateTime<Utc>,
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

/// Generate rows from `config.start` until the cursor passes `start + days`.
///
/// The cursor advances before each row, so the first row is one (jittered)
/// interval after `start` and the last may land slightly past the end.
pub fn generate_rows(config: &GeneratorConfig) -> Result<Vec<GeneratedRow>, AppError> {
    if config.days == 0 {
        return Err(AppError::new(2, "Generator day count must be > 0."));
    }
    let step = Duration::try_minutes(config.interval_minutes)
        .filter(|s| *s > Duration::zero())
        .ok_or_else(|| AppError::new(2, "Generator interval must be a positive number of minutes."))?;
    Duration::try_seconds(config.jitter_secs)
        .filter(|j| *j >= Duration::zero() && *j < step)
        .ok_or_else(|| {
            AppError::new(
                2,
                "Generator interval must be longer than its jitter (and jitter >= 0).",
            )
        })?;

    let out_of_range = || AppError::new(2, "Generated time span runs past the supported date range.");
    let end = config
        .start
        .checked_add_signed(Duration::days(i64::from(config.days)))
        .ok_or_else(out_of_range)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let ping_dist = Normal::new(PING_MEAN, PING_STD_DEV)
        .map_err(|e| AppError::new(4, format!("Ping distribution error: {e}")))?;

    let mut cursor = config.start;
    let mut rows = Vec::new();

    while cursor < end {
        let jitter = rng.gen_range(-config.jitter_secs..=config.jitter_secs);
        cursor = step
            .checked_add(&Duration::seconds(jitter))
            .and_then(|delta| cursor.checked_add_signed(delta))
            .ok_or_else(out_of_range)?;

        let ping = if rng.gen_bool(OUTLIER_PING_CHANCE) {
            rng.gen_range(OUTLIER_PING_RANGE.0..=OUTLIER_PING_RANGE.1)
        } else {
            ping_dist.sample(&mut rng).abs()
        };
        let download = rng.gen_range(DOWNLOAD_RANGE.0..=DOWNLOAD_RANGE.1);
        let upload = rng.gen_range(UPLOAD_RANGE.0..=UPLOAD_RANGE.1);

        rows.push(GeneratedRow {
            timestamp_utc: cursor,
            ping_ms: round3(ping),
            download_mbps: round3(download),
            upload_mbps: round3(upload),
        });
    }

    Ok(rows)
}

/// Write generated rows as CSV with `Z`-suffixed timestamps and an empty
/// comment column.
pub fn write_generated_csv<W: Write>(writer: W, rows: &[GeneratedRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(GENERATED_HEADERS)?;
    for row in rows {
        wtr.write_record([
            row.timestamp_utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            row.ping_ms.to_string(),
            row.download_mbps.to_string(),
            row.upload_mbps.to_string(),
            String::new(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ColumnAliasMap, normalize, read_raw_batch};

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            days: 2,
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn same_seed_same_rows() {
        let a = generate_rows(&small_config(7)).unwrap();
        let b = generate_rows(&small_config(7)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, generate_rows(&small_config(8)).unwrap());
    }

    #[test]
    fn rows_respect_ranges_and_cadence() {
        let config = small_config(1);
        let rows = generate_rows(&config).unwrap();
        // 2 days at ~5 minute steps
        assert!(rows.len() > 500 && rows.len() < 700, "len={}", rows.len());

        let mut prev = config.start;
        for row in &rows {
            let gap = (row.timestamp_utc - prev).num_seconds();
            assert!((240..=360).contains(&gap), "gap={gap}");
            prev = row.timestamp_utc;

            assert!(row.ping_ms >= 0.0 && row.ping_ms <= OUTLIER_PING_RANGE.1);
            assert!((DOWNLOAD_RANGE.0..=DOWNLOAD_RANGE.1).contains(&row.download_mbps));
            assert!((UPLOAD_RANGE.0..=UPLOAD_RANGE.1).contains(&row.upload_mbps));
            assert_eq!(round3(row.download_mbps), row.download_mbps);
        }
        let end = config.start + Duration::days(2);
        assert!(rows[rows.len() - 2].timestamp_utc < end);
    }

    #[test]
    fn generated_csv_normalizes_without_rejections() {
        let rows = generate_rows(&small_config(3)).unwrap();
        let mut buf = Vec::new();
        write_generated_csv(&mut buf, &rows).unwrap();

        let batch = read_raw_batch(buf.as_slice(), "generated").unwrap();
        let normalized = normalize(&batch, &ColumnAliasMap::default()).unwrap();
        assert_eq!(normalized.rejected(), 0);
        assert_eq!(normalized.records.len(), rows.len());
        assert_eq!(normalized.records[0].timestamp_utc, rows[0].timestamp_utc);
        assert_eq!(normalized.records[0].ping_ms, rows[0].ping_ms);
    }

    #[test]
    fn invalid_settings_are_config_errors() {
        let zero_days = GeneratorConfig {
            days: 0,
            ..GeneratorConfig::default()
        };
        assert_eq!(generate_rows(&zero_days).unwrap_err().exit_code(), 2);

        let jitter_too_wide = GeneratorConfig {
            interval_minutes: 1,
            jitter_secs: 90,
            ..GeneratorConfig::default()
        };
        assert_eq!(generate_rows(&jitter_too_wide).unwrap_err().exit_code(), 2);

        let interval_too_long = GeneratorConfig {
            interval_minutes: i64::MAX,
            ..GeneratorConfig::default()
        };
        assert_eq!(generate_rows(&interval_too_long).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn span_past_the_calendar_range_is_a_config_error() {
        let near_the_end = GeneratorConfig {
            start: Utc.with_ymd_and_hms(262_000, 1, 1, 0, 0, 0).unwrap(),
            days: 1_000_000,
            ..GeneratorConfig::default()
        };
        assert_eq!(generate_rows(&near_the_end).unwrap_err().exit_code(), 2);
    }
}
