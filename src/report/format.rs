//! Terminal formatting.
//!
//! Plain fixed-width tables. NaN statistics print as `n/a`, as do weekdays
//! with no data.

use crate::domain::Metric;
use crate::report::{
    AnalysisReport, CutoverReport, DatasetInfo, DayRow, DayTypeHourRow, HourRow, RealtimeReport,
};
use crate::stats::{
    AggregateStats, Comparison, CorrelationMatrix, DeltaResult, GroupMeans, Histogram,
    IntervalMean, PeriodComparison,
};

/// Format the full `stats` output.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("=== speedstat - Speedtest Statistics ===\n");
    out.push_str(&format_dataset(&report.dataset));

    out.push_str("\nSummary:\n");
    out.push_str(&format_summary(&report.summary));

    out.push_str("\nBy hour of day (local):\n");
    out.push_str(&format_hourly(&report.hourly));

    out.push_str("\nBy day of week:\n");
    out.push_str(&format_day_of_week(&report.by_day_of_week));

    out.push_str("\nWeekday vs weekend by hour:\n");
    out.push_str(&format_day_type_hour(&report.by_day_type_hour));

    out.push_str("\nCorrelation (Pearson):\n");
    out.push_str(&format_correlation(&report.correlation));

    out.push_str("\nDistributions:\n");
    out.push_str(&format_histograms(&report.histograms));

    out.push_str("\nSlowest intervals (by mean download):\n");
    out.push_str(&format_slowest(&report.slowest_intervals));

    out
}

pub fn format_dataset(info: &DatasetInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("Source: {}\n", info.source));
    out.push_str(&format!("Zone: {}\n", info.zone));
    out.push_str(&format!(
        "Rows: read={} | rejected={} | records={}\n",
        info.rows_read, info.rows_rejected, info.records
    ));
    if let (Some(first), Some(last)) = (info.first_local, info.last_local) {
        out.push_str(&format!(
            "Span: {} .. {}\n",
            first.format("%Y-%m-%d %H:%M:%S %:z"),
            last.format("%Y-%m-%d %H:%M:%S %:z")
        ));
    }
    out
}

pub fn format_summary(stats: &AggregateStats) -> String {
    let mut out = header_line(&[
        ("metric", 16, false),
        ("count", 7, true),
        ("mean", 10, true),
        ("std", 10, true),
        ("min", 10, true),
        ("p25", 10, true),
        ("p50", 10, true),
        ("p75", 10, true),
        ("max", 10, true),
    ]);
    for metric in Metric::ALL {
        let s = stats.get(metric);
        out.push_str(
            format!(
                "{:<16} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                metric_label(metric),
                s.count,
                fmt_num(s.mean),
                fmt_num(s.std),
                fmt_num(s.min),
                fmt_num(s.p25),
                fmt_num(s.p50),
                fmt_num(s.p75),
                fmt_num(s.max),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

pub fn format_hourly(rows: &[HourRow]) -> String {
    if rows.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut out = means_header("hour", 6);
    for r in rows {
        out.push_str(&means_line(&format!("{:02}:00", r.hour), 6, Some(&r.means)));
    }
    out
}

pub fn format_day_of_week(rows: &[DayRow]) -> String {
    let mut out = means_header("day", 10);
    for r in rows {
        out.push_str(&means_line(r.day, 10, r.means.as_ref()));
    }
    out
}

pub fn format_day_type_hour(rows: &[DayTypeHourRow]) -> String {
    if rows.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut out = means_header("slot", 14);
    for r in rows {
        let label = format!("{} {:02}:00", r.day_type, r.hour);
        out.push_str(&means_line(&label, 14, Some(&r.means)));
    }
    out
}

pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = format!("{:<10}", "");
    for m in matrix.metrics {
        out.push_str(&format!(" {:>10}", m.display_name()));
    }
    out.push('\n');
    for (i, row) in matrix.values.iter().enumerate() {
        out.push_str(&format!("{:<10}", matrix.metrics[i].display_name()));
        for v in row {
            out.push_str(&format!(" {:>10}", fmt_prec(*v, 3)));
        }
        out.push('\n');
    }
    out
}

/// One line per metric: range, bin count and the most populated bin.
pub fn format_histograms(histograms: &[Histogram]) -> String {
    let mut out = String::new();
    for h in histograms {
        let (Some(first), Some(last), Some(mode)) = (h.bins.first(), h.bins.last(), h.mode_bin()) else {
            out.push_str(&format!("{:<16} (no data)\n", metric_label(h.metric)));
            continue;
        };
        out.push_str(&format!(
            "{:<16} range=[{}, {}] bins={} mode=[{}, {}] ({} of {})\n",
            metric_label(h.metric),
            fmt_num(first.lower),
            fmt_num(last.upper),
            h.bins.len(),
            fmt_num(mode.lower),
            fmt_num(mode.upper),
            mode.count,
            h.total(),
        ));
    }
    out
}

pub fn format_slowest(intervals: &[IntervalMean]) -> String {
    if intervals.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut out = means_header("interval start (local)", 26);
    for i in intervals {
        let label = i.start_local.format("%Y-%m-%d %H:%M %:z").to_string();
        out.push_str(&means_line(&label, 26, Some(&i.means)));
    }
    out
}

/// Format the `compare` output.
pub fn format_cutover_report(report: &CutoverReport) -> String {
    let mut out = String::new();
    out.push_str("=== speedstat - Cutover Comparison ===\n");
    out.push_str(&format_dataset(&report.dataset));
    out.push_str(&format!(
        "Cutover: {} | before={} | after={}\n\n",
        report.cutover.to_rfc3339(),
        report.before,
        report.after
    ));
    out.push_str(&format_comparison(&report.comparison));
    out
}

/// Format one `realtime` evaluation.
pub fn format_realtime_report(report: &RealtimeReport) -> String {
    let mut out = String::new();
    out.push_str("=== speedstat - Recent vs Historical ===\n");
    out.push_str(&format_dataset(&report.dataset));
    out.push_str(&format!(
        "Window: {} .. {} | recent={}\n",
        report.window_start.format("%Y-%m-%d %H:%M:%S %:z"),
        report.window_end.format("%Y-%m-%d %H:%M:%S %:z"),
        report.recent,
    ));
    out.push_str(&format!(
        "History: earlier {}s {}-{} | historical={}\n",
        report.weekday, report.slot.0, report.slot.1, report.historical,
    ));
    if report.crosses_midnight {
        out.push_str("Note: window crosses local midnight; no historical slot can match.\n");
    }
    out.push('\n');
    out.push_str(&format_comparison(&report.comparison));
    out
}

/// Format a comparison result, or the notice for a skipped one.
pub fn format_comparison(comparison: &Comparison) -> String {
    match comparison {
        Comparison::Compared(c) => format_period_comparison(c),
        Comparison::Skipped(empty) => format!("Comparison skipped: {empty}.\n"),
    }
}

fn format_period_comparison(c: &PeriodComparison) -> String {
    let base = c.baseline_side.as_str();
    let cur = c.current_side.as_str();

    let mut out = header_line(&[
        ("metric", 16, false),
        (base, 12, true),
        (cur, 12, true),
        ("change", 10, true),
        ("", 10, false),
    ]);
    for d in &c.deltas {
        out.push_str(
            format!(
                "{:<16} {:>12} {:>12} {:>10} {:<10}",
                metric_label(d.metric),
                fmt_num(d.baseline_value),
                fmt_num(d.current_value),
                fmt_pct(d.percent_change),
                direction(d),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out.push_str(&format!(
        "(n: {}={}, {}={})\n",
        base,
        c.baseline.count(),
        cur,
        c.current.count()
    ));
    out
}

/// Better/worse wording for a delta, using the metric's direction.
fn direction(d: &DeltaResult) -> &'static str {
    if d.percent_change == 0.0 || d.percent_change.is_nan() {
        return "unchanged";
    }
    let rising = d.percent_change > 0.0;
    if rising != d.metric.lower_is_better() {
        "better"
    } else {
        "worse"
    }
}

fn means_header(label: &str, width: usize) -> String {
    header_line(&[
        (label, width, false),
        ("n", 6, true),
        ("ping ms", 10, true),
        ("down Mbps", 10, true),
        ("up Mbps", 10, true),
    ])
}

fn means_line(label: &str, width: usize, means: Option<&GroupMeans>) -> String {
    let line = match means {
        Some(m) => format!(
            "{:<width$} {:>6} {:>10} {:>10} {:>10}",
            label,
            m.count,
            fmt_num(m.ping_ms),
            fmt_num(m.download_mbps),
            fmt_num(m.upload_mbps),
        ),
        None => format!("{:<width$} {:>6} {:>10} {:>10} {:>10}", label, 0, "n/a", "n/a", "n/a"),
    };
    format!("{}\n", line.trim_end())
}

/// Column titles plus a dashed rule. `(title, width, right_aligned)`.
fn header_line(cols: &[(&str, usize, bool)]) -> String {
    let titles: Vec<String> = cols
        .iter()
        .map(|&(t, w, right)| if right { format!("{t:>w$}") } else { format!("{t:<w$}") })
        .collect();
    let rules: Vec<String> = cols.iter().map(|&(_, w, _)| "-".repeat(w)).collect();
    format!("{}\n{}\n", titles.join(" ").trim_end(), rules.join(" ").trim_end())
}

fn metric_label(metric: Metric) -> String {
    format!("{} ({})", metric.display_name(), metric.unit())
}

fn fmt_num(v: f64) -> String {
    fmt_prec(v, 2)
}

fn fmt_prec(v: f64, prec: usize) -> String {
    if v.is_finite() {
        format!("{v:.prec$}")
    } else {
        "n/a".to_string()
    }
}

fn fmt_pct(v: f64) -> String {
    if v.is_finite() {
        format!("{v:+.2}%")
    } else {
        "n/a".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::test_config;
    use crate::stats::{FieldSummary, describe};
    use crate::domain::RecordSet;
    use crate::window::{EmptyPartition, PartitionSide};

    fn stats(ping: f64, download: f64) -> AggregateStats {
        AggregateStats {
            ping_ms: FieldSummary::from_values(&[ping]),
            download_mbps: FieldSummary::from_values(&[download]),
            upload_mbps: FieldSummary::from_values(&[10.0]),
        }
    }

    #[test]
    fn summary_prints_na_for_undefined_stats() {
        let text = format_summary(&describe(&RecordSet::default()));
        let ping_line = text.lines().find(|l| l.starts_with("Ping")).unwrap();
        assert!(ping_line.contains("n/a"));
        assert!(ping_line.contains(" 0 "));
    }

    #[test]
    fn missing_weekdays_show_na() {
        let rows = vec![
            DayRow { day: "Monday", means: None },
            DayRow {
                day: "Tuesday",
                means: Some(GroupMeans {
                    count: 2,
                    ping_ms: 5.0,
                    download_mbps: 55.0,
                    upload_mbps: 20.0,
                }),
            },
        ];
        let text = format_day_of_week(&rows);
        let monday = text.lines().find(|l| l.starts_with("Monday")).unwrap();
        assert!(monday.ends_with("n/a"));
        let tuesday = text.lines().find(|l| l.starts_with("Tuesday")).unwrap();
        assert!(tuesday.contains("55.00"));
    }

    #[test]
    fn rising_ping_is_worse_and_rising_download_is_better() {
        let base = stats(10.0, 100.0);
        let cur = stats(15.0, 150.0);
        let comparison = Comparison::Compared(PeriodComparison {
            baseline_side: PartitionSide::Before,
            current_side: PartitionSide::After,
            deltas: crate::stats::mean_deltas(&base, &cur),
            baseline: base,
            current: cur,
        });
        let text = format_comparison(&comparison);
        let ping = text.lines().find(|l| l.starts_with("Ping")).unwrap();
        assert!(ping.contains("+50.00%") && ping.ends_with("worse"));
        let download = text.lines().find(|l| l.starts_with("Download")).unwrap();
        assert!(download.ends_with("better"));
        let upload = text.lines().find(|l| l.starts_with("Upload")).unwrap();
        assert!(upload.ends_with("unchanged"));
    }

    #[test]
    fn skipped_comparison_is_a_notice() {
        let text = format_comparison(&Comparison::Skipped(EmptyPartition {
            sides: vec![PartitionSide::Recent],
        }));
        assert_eq!(text, "Comparison skipped: no records in the recent partition.\n");
    }

    #[test]
    fn empty_report_formats() {
        let config = test_config();
        let empty = RecordSet::default();
        let report = AnalysisReport::build(
            &empty,
            DatasetInfo::new(&config, &empty, 0, 0),
            &config,
        );
        let text = format_report(&report);
        assert!(text.contains("By day of week:"));
        assert!(text.contains("(no data)"));
    }
}
