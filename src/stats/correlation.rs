//! Pearson correlation between metrics.

use serde::Serialize;

use crate::domain::{Metric, RecordSet};

/// Pearson's r, or NaN when undefined (fewer than two points, unequal
/// lengths, or zero variance on either side).
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return f64::NAN;
    }
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// Symmetric 3×3 matrix over `Metric::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: [Metric; 3],
    pub values: [[f64; 3]; 3],
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> f64 {
        let idx = |m: Metric| Metric::ALL.iter().position(|&x| x == m).unwrap_or(0);
        self.values[idx(a)][idx(b)]
    }
}

pub fn correlation_matrix(set: &RecordSet) -> CorrelationMatrix {
    let columns = Metric::ALL.map(|m| set.values(m));
    let mut values = [[f64::NAN; 3]; 3];
    for i in 0..3 {
        for j in i..3 {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        metrics: Metric::ALL,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_linear_series() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [10.0, 20.0, 30.0, 40.0];
        let down = [4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&xs, &up) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_cases_are_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, 2.0], &[3.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn empty_set_matrix_is_all_nan() {
        let m = correlation_matrix(&RecordSet::default());
        assert!(m.values.iter().flatten().all(|v| v.is_nan()));
        assert!(m.get(Metric::PingMs, Metric::UploadMbps).is_nan());
    }
}
