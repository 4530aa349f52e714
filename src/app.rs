//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and initializes logging
//! - resolves flags + environment into an `AnalysisConfig`
//! - runs the load/enrich pipeline and the requested analysis
//! - prints reports and writes optional exports

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, CompareArgs, GenerateArgs, RealtimeArgs, StatsArgs};
use crate::clock::{Clock, ManualClock, SystemClock};
use crate::data::{GeneratorConfig, generate_rows, write_generated_csv};
use crate::domain::{AnalysisConfig, RecordSet};
use crate::error::AppError;
use crate::io::LoadCache;
use crate::report::{format_cutover_report, format_realtime_report, format_report};
use crate::stats::Comparison;
use crate::window::RollingWindow;

pub mod config;
pub mod pipeline;

use config::{EnvDefaults, Tuning, parse_instant, parse_utc_instant, resolve_config};

/// Entry point for the `speedstat` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Stats(args) => handle_stats(args),
        Command::Compare(args) => handle_compare(args),
        Command::Realtime(args) => handle_realtime(args),
        Command::Generate(args) => handle_generate(args),
    }
}

/// Log to stderr so stdout stays clean for reports. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "speedtest_stats=debug" } else { "speedtest_stats=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_stats(args: StatsArgs) -> Result<(), AppError> {
    let tuning = Tuning {
        histogram_bins: args.bins,
        interval_minutes: args.interval_mins,
        top_n: args.top,
    };
    let config = resolve_config(&args.source, &EnvDefaults::load(), tuning)?;
    let mut cache = LoadCache::new(SystemClock, config.cache_ttl);

    let run = pipeline::run_stats(&config, &mut cache)?;
    println!("{}", format_report(&run.report));
    write_exports(&config, &run.set, &run.report)
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let config = resolve_config(&args.source, &EnvDefaults::load(), Tuning::default())?;
    let cutover = parse_instant(&args.cutover, &config.zone)?;
    let mut cache = LoadCache::new(SystemClock, config.cache_ttl);

    let run = pipeline::run_cutover(&config, &mut cache, cutover)?;
    log_skipped(&run.report.comparison);
    println!("{}", format_cutover_report(&run.report));
    write_exports(&config, &run.set, &run.report)
}

fn handle_realtime(args: RealtimeArgs) -> Result<(), AppError> {
    let config = resolve_config(&args.source, &EnvDefaults::load(), Tuning::default())?;
    let window = RollingWindow::minutes(args.window_mins).ok_or_else(|| {
        AppError::new(
            2,
            format!("Window length must be a positive number of minutes, got {}.", args.window_mins),
        )
    })?;

    if let Some(text) = &args.now {
        let now = parse_instant(text, &config.zone)?;
        let mut cache = LoadCache::new(ManualClock::new(now.with_timezone(&chrono::Utc)), config.cache_ttl);
        return realtime_once(&config, &mut cache, window);
    }

    let mut cache = LoadCache::new(SystemClock, config.cache_ttl);
    let Some(secs) = args.watch else {
        return realtime_once(&config, &mut cache, window);
    };
    if secs == 0 {
        return Err(AppError::new(2, "--watch interval must be > 0 seconds."));
    }

    info!(every_secs = secs, "watching; press Ctrl-C to stop");
    loop {
        if let Err(err) = realtime_once(&config, &mut cache, window) {
            warn!(error = %err, "refresh failed; retrying on next tick");
        }
        std::thread::sleep(std::time::Duration::from_secs(secs));
    }
}

fn realtime_once<C: Clock>(
    config: &AnalysisConfig,
    cache: &mut LoadCache<C>,
    window: RollingWindow,
) -> Result<(), AppError> {
    let run = pipeline::run_realtime(config, cache, window)?;
    log_skipped(&run.report.comparison);
    println!("{}", format_realtime_report(&run.report));
    write_exports(config, &run.set, &run.report)
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let mut config = GeneratorConfig {
        days: args.days,
        interval_minutes: args.interval_mins,
        jitter_secs: args.jitter_secs,
        seed: args.seed,
        ..GeneratorConfig::default()
    };
    if let Some(text) = &args.start {
        config.start = parse_utc_instant(text)?;
    }

    let rows = generate_rows(&config)?;
    let file = File::create(&args.output).map_err(|e| {
        AppError::new(4, format!("Failed to create output CSV '{}': {e}", args.output.display()))
    })?;
    write_generated_csv(BufWriter::new(file), &rows).map_err(|e| {
        AppError::new(4, format!("Failed to write output CSV '{}': {e}", args.output.display()))
    })?;

    info!(rows = rows.len(), seed = config.seed, "generated synthetic data");
    println!("Wrote {} rows to '{}'", rows.len(), args.output.display());
    Ok(())
}

fn log_skipped(comparison: &Comparison) {
    if let Comparison::Skipped(empty) = comparison {
        warn!(%empty, "comparison skipped");
    }
}

fn write_exports<R: Serialize>(config: &AnalysisConfig, set: &RecordSet, report: &R) -> Result<(), AppError> {
    if let Some(path) = &config.export_json {
        crate::io::export_report_json(path, report)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    if let Some(path) = &config.export_csv {
        crate::io::export_records_csv(path, set)?;
        info!(path = %path.display(), records = set.len(), "wrote enriched CSV");
    }
    Ok(())
}
