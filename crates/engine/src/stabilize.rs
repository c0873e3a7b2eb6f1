//! Stabilization.
//!
//! Circuit breakers and variance clamping, applied to every non-intervened
//! node's sample vector after effect propagation. Both are pure in-place
//! transformations so they can be tested in isolation from the engine loop.

use cascade_model::CircuitBreakers;

/// Fallback breaker values from the run configuration, used for fields a
/// node leaves unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakerDefaults {
    pub prior_weight: f64,
    pub max_std_dev_ratio: f64,
}

impl Default for BreakerDefaults {
    fn default() -> Self {
        Self { prior_weight: 0.0, max_std_dev_ratio: 3.0 }
    }
}

/// Apply a node's circuit breakers to its sample vector.
///
/// Per sample: non-finite values are replaced by the prior mean, then the
/// optional min/max bounds clamp, then the optional prior-weight pulls the
/// sample toward the prior mean. Mean reversion only engages for weights in
/// (0, 1]; the default weight is 0, i.e. off.
pub fn apply_circuit_breakers(
    samples: &mut [f64],
    breakers: Option<&CircuitBreakers>,
    prior_mean: f64,
    defaults: &BreakerDefaults,
) {
    let min = breakers.and_then(|b| b.min);
    let max = breakers.and_then(|b| b.max);
    let prior_weight =
        breakers.and_then(|b| b.prior_weight).unwrap_or(defaults.prior_weight);

    for value in samples.iter_mut() {
        if !value.is_finite() {
            *value = prior_mean;
        }
        if let Some(min) = min
            && *value < min
        {
            *value = min;
        }
        if let Some(max) = max
            && *value > max
        {
            *value = max;
        }
        if prior_weight > 0.0 && prior_weight <= 1.0 {
            *value = prior_mean + (*value - prior_mean) * (1.0 - prior_weight);
        }
    }
}

/// Compress a sample vector's spread when its empirical standard deviation
/// exceeds `|mean| * max_ratio`.
///
/// Compression rescales every deviation from the empirical mean by the same
/// factor, so bounds already enforced by the breakers are preserved.
pub fn clamp_variance(samples: &mut [f64], max_ratio: f64) {
    if samples.is_empty() {
        return;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let cap = mean.abs() * max_ratio;
    if std_dev > cap && cap > 0.0 {
        let scale = cap / std_dev;
        for value in samples.iter_mut() {
            *value = mean + (*value - mean) * scale;
        }
    }
}

/// Effective variance cap ratio for a node.
pub fn max_std_dev_ratio(breakers: Option<&CircuitBreakers>, defaults: &BreakerDefaults) -> f64 {
    breakers.and_then(|b| b.max_std_dev_ratio).unwrap_or(defaults.max_std_dev_ratio)
}
