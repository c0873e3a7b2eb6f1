//! Prior distributions.
//!
//! Closed tagged union over the univariate distributions a node can declare
//! as its prior. The analytic moments live here; drawing actual sample
//! vectors is the engine's job, so that the schema crate stays free of RNG
//! concerns.

use serde::{Deserialize, Serialize};

/// A parameterized univariate distribution.
///
/// Discriminated by a `type` tag on the wire. Unknown tags fail
/// deserialization, which is the first line of model validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Distribution {
    /// Bernoulli on {0, 1} with success probability `p`.
    Binary { p: f64 },
    /// Discrete distribution over {0..k-1} with the given probabilities.
    Categorical { probs: Vec<f64> },
    /// Gaussian with the given mean and standard deviation.
    Normal { mean: f64, std_dev: f64 },
    /// Lognormal; `mu` and `sigma` are the log-scale parameters.
    Lognormal { mu: f64, sigma: f64 },
    /// Beta on (0, 1).
    Beta { alpha: f64, beta: f64 },
    /// Gamma with shape/rate parameterization.
    Gamma { shape: f64, rate: f64 },
    /// Bounded PERT on [min, max] with the given most-likely value.
    Bounded { min: f64, max: f64, mode: f64 },
    /// Poisson count with rate `lambda`.
    Count { lambda: f64 },
    /// A probability-valued quantity on (0, 1); Beta-shaped.
    Rate { alpha: f64, beta: f64 },
}

impl Distribution {
    /// Analytic expectation.
    ///
    /// Degenerate parameters yield 0 rather than NaN: an empty categorical
    /// has mean 0, and Beta/Rate with `alpha + beta == 0` has mean 0.
    pub fn mean(&self) -> f64 {
        match self {
            Distribution::Binary { p } => *p,
            Distribution::Categorical { probs } => probs
                .iter()
                .enumerate()
                .map(|(i, p)| i as f64 * p)
                .sum(),
            Distribution::Normal { mean, .. } => *mean,
            Distribution::Lognormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
            Distribution::Beta { alpha, beta } | Distribution::Rate { alpha, beta } => {
                let total = alpha + beta;
                if total == 0.0 { 0.0 } else { alpha / total }
            }
            Distribution::Gamma { shape, rate } => {
                if *rate == 0.0 { 0.0 } else { shape / rate }
            }
            Distribution::Bounded { min, max, mode } => (min + 4.0 * mode + max) / 6.0,
            Distribution::Count { lambda } => *lambda,
        }
    }

    /// Analytic standard deviation.
    ///
    /// Bounded PERT uses the (max - min) / 6 approximation.
    pub fn std_dev(&self) -> f64 {
        match self {
            Distribution::Binary { p } => (p * (1.0 - p)).max(0.0).sqrt(),
            Distribution::Categorical { probs } => {
                let mean = self.mean();
                let second: f64 = probs
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i as f64) * (i as f64) * p)
                    .sum();
                (second - mean * mean).max(0.0).sqrt()
            }
            Distribution::Normal { std_dev, .. } => *std_dev,
            Distribution::Lognormal { mu, sigma } => {
                let s2 = sigma * sigma;
                ((s2.exp() - 1.0) * (2.0 * mu + s2).exp()).max(0.0).sqrt()
            }
            Distribution::Beta { alpha, beta } | Distribution::Rate { alpha, beta } => {
                let total = alpha + beta;
                if total == 0.0 {
                    return 0.0;
                }
                (alpha * beta / (total * total * (total + 1.0))).max(0.0).sqrt()
            }
            Distribution::Gamma { shape, rate } => {
                if *rate == 0.0 { 0.0 } else { shape.max(0.0).sqrt() / rate }
            }
            Distribution::Bounded { min, max, .. } => (max - min) / 6.0,
            Distribution::Count { lambda } => lambda.max(0.0).sqrt(),
        }
    }
}
