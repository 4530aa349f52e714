//! Shared load → normalize → enrich pipeline used by every analysis command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source fetch (cached) -> alias resolution + cleaning -> enrichment
//!
//! The command handlers then only pick a partitioning / aggregation and
//! decide how to present it.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::domain::{AnalysisConfig, RecordSet};
use crate::error::AppError;
use crate::io::{CacheStatus, ColumnAliasMap, LoadCache, normalize, open_source};
use crate::report::{AnalysisReport, CutoverReport, DatasetInfo, RealtimeReport};
use crate::temporal::enrich;
use crate::window::{RollingWindow, partition_by_cutover, partition_recent_vs_historical};

/// The enriched data of one run.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub set: RecordSet,
    pub dataset: DatasetInfo,
}

/// All outputs of a single command run: the enriched records (for CSV export)
/// and the command's report.
#[derive(Debug, Clone)]
pub struct RunOutput<R> {
    pub set: RecordSet,
    pub report: R,
}

/// Load the configured source through `cache`, clean it and enrich it.
pub fn load_records<C: Clock>(config: &AnalysisConfig, cache: &mut LoadCache<C>) -> Result<LoadedData, AppError> {
    let aliases = match &config.aliases_path {
        Some(path) => ColumnAliasMap::from_json_file(path)?,
        None => ColumnAliasMap::default(),
    };

    let source = open_source(&config.source);
    let (batch, status) = cache.get_or_load(&config.source.key(), || source.fetch())?;
    match status {
        CacheStatus::Hit => debug!(source = %source.name(), "using cached raw batch"),
        CacheStatus::Expired => debug!(source = %source.name(), "cache expired; reloaded"),
        CacheStatus::Miss => {}
    }
    info!(source = %source.name(), rows = batch.len(), "loaded raw batch");

    let normalized = normalize(&batch, &aliases)?;
    for rejection in &normalized.rejections {
        debug!(line = rejection.line, reason = %rejection.reason, "rejected row");
    }
    if normalized.rejected() > 0 {
        info!(
            rejected = normalized.rejected(),
            kept = normalized.records.len(),
            "dropped invalid rows"
        );
    }

    let set = enrich(&normalized.records, &config.zone);
    info!(records = set.len(), zone = %config.zone, "enriched records");

    let dataset = DatasetInfo::new(config, &set, normalized.rows_read, normalized.rejected());
    Ok(LoadedData { set, dataset })
}

/// `speedstat stats`.
pub fn run_stats<C: Clock>(
    config: &AnalysisConfig,
    cache: &mut LoadCache<C>,
) -> Result<RunOutput<AnalysisReport>, AppError> {
    let LoadedData { set, dataset } = load_records(config, cache)?;
    let report = AnalysisReport::build(&set, dataset, config);
    Ok(RunOutput { set, report })
}

/// `speedstat compare --cutover`.
pub fn run_cutover<C: Clock>(
    config: &AnalysisConfig,
    cache: &mut LoadCache<C>,
    cutover: DateTime<FixedOffset>,
) -> Result<RunOutput<CutoverReport>, AppError> {
    let LoadedData { set, dataset } = load_records(config, cache)?;
    let partition = partition_by_cutover(&set, cutover);
    info!(before = partition.before.len(), after = partition.after.len(), "partitioned at cutover");
    let report = CutoverReport::build(&partition, dataset);
    Ok(RunOutput { set, report })
}

/// `speedstat realtime`, evaluated at the cache clock's "now".
pub fn run_realtime<C: Clock>(
    config: &AnalysisConfig,
    cache: &mut LoadCache<C>,
    window: RollingWindow,
) -> Result<RunOutput<RealtimeReport>, AppError> {
    let LoadedData { set, dataset } = load_records(config, cache)?;
    let now: DateTime<Utc> = cache.clock().now();
    let split = partition_recent_vs_historical(&set, now, window, &config.zone)
        .ok_or_else(|| AppError::new(2, "Window reaches outside the supported date range."))?;
    info!(
        recent = split.recent.len(),
        historical = split.historical.len(),
        crosses_midnight = split.window.crosses_midnight(),
        "partitioned recent vs historical"
    );
    let report = RealtimeReport::build(&split, dataset);
    Ok(RunOutput { set, report })
}
