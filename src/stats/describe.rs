//! Whole-set descriptive statistics.
//!
//! Per metric: count, mean, sample standard deviation (n − 1), min, max and
//! the 25th/50th/75th percentiles by linear interpolation between order
//! statistics. Undefined values are NaN (std with n < 2, everything with
//! n = 0).

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{Metric, RecordSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl FieldSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self {
                count: 0,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                p25: f64::NAN,
                p50: f64::NAN,
                p75: f64::NAN,
            };
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n as f64 - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            max: sorted[n - 1],
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.50),
            p75: quantile(&sorted, 0.75),
        }
    }
}

/// Linear-interpolated quantile of an ascending slice (NaN when empty).
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = pos - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Fixed-shape summary of a record set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateStats {
    pub ping_ms: FieldSummary,
    pub download_mbps: FieldSummary,
    pub upload_mbps: FieldSummary,
}

impl AggregateStats {
    pub fn get(&self, metric: Metric) -> &FieldSummary {
        match metric {
            Metric::PingMs => &self.ping_ms,
            Metric::DownloadMbps => &self.download_mbps,
            Metric::UploadMbps => &self.upload_mbps,
        }
    }

    pub fn count(&self) -> usize {
        self.ping_ms.count
    }
}

pub fn describe(set: &RecordSet) -> AggregateStats {
    AggregateStats {
        ping_ms: FieldSummary::from_values(&set.values(Metric::PingMs)),
        download_mbps: FieldSummary::from_values(&set.values(Metric::DownloadMbps)),
        upload_mbps: FieldSummary::from_values(&set.values(Metric::UploadMbps)),
    }
}
