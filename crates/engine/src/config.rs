//! Run configuration.
//!
//! All knobs of a propagation run, deserializable from the same camelCase
//! document convention as the model itself. Every field has a default, so an
//! empty `{}` is a valid configuration.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use cascade_foundation::fnv1a64;

use crate::kernel::EffectLimits;
use crate::stabilize::BreakerDefaults;

/// Smallest permitted sample vector length.
pub const MIN_SAMPLE_COUNT: usize = 50;
/// Largest permitted sample vector length.
pub const MAX_SAMPLE_COUNT: usize = 1000;

/// Configuration for propagation and sensitivity runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Length of every sample vector.
    pub sample_count: usize,
    /// Resolution of density curves (the curve has `kde_point_count + 1`
    /// evaluation points).
    pub kde_point_count: usize,
    /// Lower bound of effect multipliers.
    pub global_min_clamp: f64,
    /// Upper bound of effect multipliers.
    pub global_max_clamp: f64,
    /// Mean-reversion strength used when a node sets no `priorWeight`.
    pub default_prior_weight: f64,
    /// Variance cap ratio used when a node sets no `maxStdDevRatio`.
    pub default_max_std_dev_ratio: f64,
    /// Run seed. `None` draws a fresh seed from the system clock, making
    /// each run distinct; set it for reproducibility.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_count: 100,
            kde_point_count: 50,
            global_min_clamp: 0.1,
            global_max_clamp: 10.0,
            default_prior_weight: 0.0,
            default_max_std_dev_ratio: 3.0,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// A default configuration pinned to the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self { rng_seed: Some(seed), ..Default::default() }
    }

    /// Sample count clamped into the permitted range.
    pub fn effective_sample_count(&self) -> usize {
        let clamped = self.sample_count.clamp(MIN_SAMPLE_COUNT, MAX_SAMPLE_COUNT);
        if clamped != self.sample_count {
            warn!(
                requested = self.sample_count,
                clamped, "sample count outside permitted range"
            );
        }
        clamped
    }

    /// Multiplier bounds for the effect kernels.
    pub fn effect_limits(&self) -> EffectLimits {
        EffectLimits { min_multiplier: self.global_min_clamp, max_multiplier: self.global_max_clamp }
    }

    /// Fallback values for nodes without explicit circuit breakers.
    pub fn breaker_defaults(&self) -> BreakerDefaults {
        BreakerDefaults {
            prior_weight: self.default_prior_weight,
            max_std_dev_ratio: self.default_max_std_dev_ratio,
        }
    }

    /// The seed this run uses: the configured one, or one derived from the
    /// system clock when none was set.
    pub fn resolved_seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(|| {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            fnv1a64(&nanos.to_le_bytes())
        })
    }
}
