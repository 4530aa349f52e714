//! Equal-width histograms.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{Metric, RecordSet};

pub const DEFAULT_BINS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub metric: Metric,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Most populated bin; the lowest one wins ties.
    pub fn mode_bin(&self) -> Option<&HistogramBin> {
        self.bins
            .iter()
            .reduce(|best, b| if b.count > best.count { b } else { best })
    }
}

/// Bin `metric` over `[min, max]` into `bins` equal-width bins.
///
/// The last bin is closed on the right so the maximum is counted. An empty set
/// gives no bins; a constant series gives one zero-width bin.
pub fn histogram(set: &RecordSet, metric: Metric, bins: usize) -> Histogram {
    let values = set.values(metric);
    let mut out = Histogram {
        metric,
        bins: Vec::new(),
    };
    if values.is_empty() || bins == 0 {
        return out;
    }

    let min = values.iter().copied().min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let max = values.iter().copied().max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let (Some(min), Some(max)) = (min, max) else {
        return out;
    };

    if max == min {
        out.bins.push(HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        });
        return out;
    }

    let width = (max - min) / bins as f64;
    out.bins = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out.bins[idx].count += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::domain::CanonicalRecord;
    use crate::temporal::{TargetZone, enrich};

    fn downloads(values: &[f64]) -> RecordSet {
        let records: Vec<CanonicalRecord> = values
            .iter()
            .enumerate()
            .map(|(i, &d)| CanonicalRecord {
                timestamp_utc: Utc.with_ymd_and_hms(2025, 3, 1, 0, i as u32, 0).unwrap(),
                ping_ms: 10.0,
                download_mbps: d,
                upload_mbps: 5.0,
            })
            .collect();
        enrich(&records, &TargetZone::default())
    }

    #[test]
    fn counts_every_value_including_max() {
        let h = histogram(&downloads(&[0.0, 1.0, 2.0, 3.0, 4.0]), Metric::DownloadMbps, 4);
        assert_eq!(h.bins.len(), 4);
        assert_eq!(h.total(), 5);
        assert_eq!(h.bins[3].count, 2);
        assert_eq!(h.bins[3].upper, 4.0);
    }

    #[test]
    fn constant_series_is_one_bin() {
        let h = histogram(&downloads(&[7.0, 7.0, 7.0]), Metric::DownloadMbps, DEFAULT_BINS);
        assert_eq!(h.bins.len(), 1);
        assert_eq!(h.bins[0].count, 3);
    }

    #[test]
    fn empty_set_has_no_bins() {
        let h = histogram(&RecordSet::default(), Metric::PingMs, DEFAULT_BINS);
        assert!(h.bins.is_empty());
        assert!(h.mode_bin().is_none());
    }

    #[test]
    fn mode_bin_prefers_lowest_on_tie() {
        let h = histogram(&downloads(&[0.0, 0.1, 9.9, 10.0]), Metric::DownloadMbps, 2);
        let mode = h.mode_bin().unwrap();
        assert_eq!(mode.lower, 0.0);
        assert_eq!(mode.count, 2);
    }
}
