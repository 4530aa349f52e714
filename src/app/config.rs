//! Run configuration: environment defaults + CLI flags → `AnalysisConfig`.
//!
//! Precedence is CLI flag, then environment (including a `.env` file loaded
//! with `dotenvy`), then built-in default.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::cli::SourceArgs;
use crate::domain::{AnalysisConfig, SourceSpec};
use crate::error::AppError;
use crate::io::DEFAULT_TTL_SECS;
use crate::stats::{DEFAULT_BINS, DEFAULT_INTERVAL_MINUTES, DEFAULT_TOP_N};
use crate::temporal::TargetZone;

pub const ENV_TZ: &str = "SPEEDSTAT_TZ";
pub const ENV_SHEET_URL: &str = "SPEEDSTAT_SHEET_URL";
pub const ENV_CACHE_TTL_SECS: &str = "SPEEDSTAT_CACHE_TTL_SECS";

/// Defaults read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub tz: Option<String>,
    pub sheet_url: Option<String>,
    pub cache_ttl_secs: Option<String>,
}

impl EnvDefaults {
    /// Load `.env` (if present) and read the process environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            tz: get(ENV_TZ),
            sheet_url: get(ENV_SHEET_URL),
            cache_ttl_secs: get(ENV_CACHE_TTL_SECS),
        }
    }
}

/// Knobs only `stats` exposes on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub histogram_bins: usize,
    pub interval_minutes: i64,
    pub top_n: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_BINS,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            top_n: DEFAULT_TOP_N,
        }
    }
}

pub fn resolve_config(args: &SourceArgs, env: &EnvDefaults, tuning: Tuning) -> Result<AnalysisConfig, AppError> {
    let source = match (&args.file, &args.sheet_url, &env.sheet_url) {
        (Some(path), _, _) => SourceSpec::File(path.clone()),
        (None, Some(url), _) | (None, None, Some(url)) => SourceSpec::Sheet(url.clone()),
        (None, None, None) => {
            return Err(AppError::new(
                2,
                format!("No data source: pass --file or --sheet-url (or set {ENV_SHEET_URL})."),
            ));
        }
    };

    let zone = match args.tz.as_deref().or(env.tz.as_deref()) {
        Some(text) => text.parse::<TargetZone>().map_err(|e| AppError::new(2, e))?,
        None => TargetZone::default(),
    };

    let cache_ttl = match &env.cache_ttl_secs {
        Some(text) => text
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|s| *s >= 0)
            .and_then(Duration::try_seconds)
            .ok_or_else(|| AppError::new(2, format!("{ENV_CACHE_TTL_SECS} must be a non-negative integer, got '{text}'.")))?,
        None => Duration::seconds(DEFAULT_TTL_SECS),
    };

    if tuning.histogram_bins == 0 {
        return Err(AppError::new(2, "Histogram bins must be > 0."));
    }
    let interval = Duration::try_minutes(tuning.interval_minutes)
        .filter(|d| *d > Duration::zero())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Interval width must be a positive number of minutes, got {}.", tuning.interval_minutes),
            )
        })?;

    Ok(AnalysisConfig {
        source,
        zone,
        aliases_path: args.aliases.clone(),
        cache_ttl,
        histogram_bins: tuning.histogram_bins,
        interval,
        top_n: tuning.top_n,
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
    })
}

/// Parse a user-supplied instant.
///
/// Accepts RFC 3339 (offset taken as written), or a naive local date-time /
/// date interpreted in `zone`. Local times that do not exist or are ambiguous
/// in `zone` (DST transitions) are rejected rather than guessed.
pub fn parse_instant(text: &str, zone: &TargetZone) -> Result<DateTime<FixedOffset>, AppError> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| AppError::new(2, format!("Unrecognized time '{text}' (use RFC 3339 or 'YYYY-MM-DD HH:MM').")))?;

    zone.from_local(naive).ok_or_else(|| {
        AppError::new(
            2,
            format!("Local time '{text}' does not exist or is ambiguous in {zone}; give an explicit offset."),
        )
    })
}

/// Like `parse_instant`, but naive inputs are UTC.
pub fn parse_utc_instant(text: &str) -> Result<DateTime<Utc>, AppError> {
    let utc = TargetZone::Fixed(FixedOffset::east_opt(0).ok_or_else(|| AppError::new(4, "UTC offset"))?);
    parse_instant(text, &utc).map(|ts| ts.with_timezone(&Utc))
}
