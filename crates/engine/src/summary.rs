//! Sample summaries.
//!
//! Turns a sample vector into the artifact the visual layer consumes: a
//! Gaussian kernel density curve (Silverman's bandwidth rule), the mean and
//! standard deviation, and five percentiles.

use serde::{Deserialize, Serialize};

/// One evaluation point of a density curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdePoint {
    pub x: f64,
    pub density: f64,
}

/// The five summary percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percentiles {
    pub p05: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Derived summary of one node's sample vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub percentiles: Percentiles,
    pub points: Vec<KdePoint>,
}

/// Summarize a sample vector with a `num_points + 1`-point density curve.
///
/// Non-finite samples are discarded up front; if nothing remains the
/// degenerate summary `{points: [(0, 1)], mean: 0, stddev: 1, percentiles:
/// 0}` is returned so downstream rendering always has a curve to draw.
pub fn summarize(samples: &[f64], num_points: usize) -> DistributionSummary {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return DistributionSummary {
            mean: 0.0,
            std_dev: 1.0,
            percentiles: Percentiles::default(),
            points: vec![KdePoint { x: 0.0, density: 1.0 }],
        };
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    // Floored so the evaluation window and bandwidth never collapse
    let std_dev = variance.sqrt().max(1.0);

    let percentiles = Percentiles {
        p05: percentile(&sorted, 0.05),
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.50),
        p75: percentile(&sorted, 0.75),
        p95: percentile(&sorted, 0.95),
    };

    // Silverman's rule of thumb
    let iqr = percentiles.p75 - percentiles.p25;
    let spread = std_dev.min(iqr / 1.34).max(f64::MIN_POSITIVE);
    let bandwidth = (0.9 * spread * (n as f64).powf(-0.2)).max(0.01);

    let lo = sorted[0] - 2.0 * std_dev;
    let hi = sorted[n - 1] + 2.0 * std_dev;
    let step = (hi - lo) / num_points.max(1) as f64;

    let inv_norm = 1.0 / ((n as f64) * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let points = (0..=num_points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = sorted
                .iter()
                .map(|&s| {
                    let t = (x - s) / bandwidth;
                    (-0.5 * t * t).exp()
                })
                .sum::<f64>()
                * inv_norm;
            KdePoint { x, density }
        })
        .collect();

    DistributionSummary { mean, std_dev, percentiles, points }
}

/// Percentile by rank: the sorted value at index `floor(n * p)`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let index = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[index]
}
