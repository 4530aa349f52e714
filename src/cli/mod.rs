//! Command-line parsing for `speedstat`.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! loading/statistics code. Flags are resolved into an `AnalysisConfig` in
//! `app::config`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "speedstat", version, about = "Speedtest log statistics and period comparisons")]
pub struct Cli {
    /// Debug-level logging on stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Descriptive statistics, hourly / day-of-week / weekday-vs-weekend means,
    /// correlation, distributions and slowest intervals.
    Stats(StatsArgs),
    /// Compare the periods before and after a cutover instant.
    Compare(CompareArgs),
    /// Compare the most recent window with the same time slot on past
    /// occurrences of today's weekday.
    Realtime(RealtimeArgs),
    /// Write a synthetic speedtest log in the source CSV schema.
    Generate(GenerateArgs),
}

/// Where to read data from, how to interpret it, and where to export.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Local CSV file.
    #[arg(long, value_name = "CSV", conflicts_with = "sheet_url")]
    pub file: Option<PathBuf>,

    /// CSV export URL of a remote sheet (default: $SPEEDSTAT_SHEET_URL).
    #[arg(long, value_name = "URL")]
    pub sheet_url: Option<String>,

    /// Target zone: IANA name or fixed offset like +09:00 (default: $SPEEDSTAT_TZ or Asia/Tokyo).
    #[arg(long, value_name = "ZONE")]
    pub tz: Option<String>,

    /// JSON file overriding column aliases.
    #[arg(long, value_name = "JSON")]
    pub aliases: Option<PathBuf>,

    /// Export the analysis result to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Export the enriched records to CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Histogram bins per metric.
    #[arg(long, default_value_t = 30)]
    pub bins: usize,

    /// Bucket width (minutes) for the slowest-interval scan.
    #[arg(long, default_value_t = 15)]
    pub interval_mins: i64,

    /// Number of slowest intervals to show.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Cutover instant: RFC 3339 (2025-01-01T09:00:00+09:00) or a local time
    /// in the target zone (2025-01-01 09:00).
    #[arg(long, value_name = "TIME")]
    pub cutover: String,
}

#[derive(Debug, Args, Clone)]
pub struct RealtimeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Length of the recent window in minutes.
    #[arg(long, default_value_t = 30)]
    pub window_mins: i64,

    /// Pin "now" instead of reading the system clock (same formats as --cutover).
    #[arg(long, value_name = "TIME", conflicts_with = "watch")]
    pub now: Option<String>,

    /// Re-run every SECS seconds; loads are cached for the configured TTL.
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output CSV path.
    #[arg(short, long, default_value = "generated-speed-test-data.csv")]
    pub output: PathBuf,

    /// First timestamp (UTC), RFC 3339 or `YYYY-MM-DD`. Defaults to 2025-08-22.
    #[arg(long, value_name = "TIME")]
    pub start: Option<String>,

    /// Number of days to cover.
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Nominal minutes between measurements.
    #[arg(long, default_value_t = 5)]
    pub interval_mins: i64,

    /// Random jitter (± seconds) applied to each step.
    #[arg(long, default_value_t = 60)]
    pub jitter_secs: i64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn realtime_defaults() {
        let cli = Cli::try_parse_from(["speedstat", "realtime", "--file", "a.csv"]).unwrap();
        let Command::Realtime(args) = cli.command else {
            panic!("expected realtime");
        };
        assert_eq!(args.window_mins, 30);
        assert!(args.now.is_none() && args.watch.is_none());
        assert_eq!(args.source.file, Some(PathBuf::from("a.csv")));
    }

    #[test]
    fn file_and_sheet_conflict() {
        let res = Cli::try_parse_from([
            "speedstat",
            "stats",
            "--file",
            "a.csv",
            "--sheet-url",
            "https://example.invalid/export?format=csv",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["speedstat", "compare", "--cutover", "2025-01-01", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
