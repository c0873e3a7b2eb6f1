//! Deterministic random number generation.
//!
//! All randomness in a cascade run derives from a single run seed via labeled
//! derivation: each node gets its own substream keyed by the node id, so the
//! samples a node draws are independent of the order in which nodes are
//! processed. This is what makes seeded runs reproducible and lets the
//! sensitivity analyzer execute perturbation runs in parallel.
//!
//! # PRNG algorithm
//!
//! SplitMix64: deterministic, portable (identical output on every platform),
//! fast, and of good statistical quality for Monte Carlo simulation.
//!
//! # Stream model
//!
//! ```text
//! run_seed
//!   └─> node id ("churn_rate")         derive() → per-node stream
//!         └─> advances with each draw, never resets
//! ```

use std::f64::consts::PI;

use crate::stable_hash::fnv1a64_str;

/// A deterministic pseudo-random number stream.
///
/// Streams are created from seeds (typically the run seed mixed with a node
/// id) and produce a reproducible sequence of values. Each generation method
/// advances the stream state; streams never reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngStream {
    state: u64,
}

impl RngStream {
    /// Create a new RNG stream from a seed.
    #[inline]
    pub const fn new(seed: u64) -> Self {
        // SplitMix64 requires a non-zero state
        let state = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state }
    }

    /// Create a stream from a string label via stable FNV-1a hashing.
    #[inline]
    pub fn from_label(label: &str) -> Self {
        Self::new(fnv1a64_str(label))
    }

    /// Create a stream by combining a parent seed with a label.
    ///
    /// This is the primary way to create per-node streams:
    /// ```ignore
    /// let stream = RngStream::derive(run_seed, node_id.as_str());
    /// ```
    #[inline]
    pub fn derive(parent_seed: u64, label: &str) -> Self {
        let mixed = splitmix64_mix(parent_seed ^ fnv1a64_str(label));
        Self::new(mixed)
    }

    /// Create an independent substream by mixing a label into the current
    /// state, without advancing this stream.
    #[inline]
    pub fn substream(&self, label: &str) -> Self {
        let mixed = splitmix64_mix(self.state ^ fnv1a64_str(label));
        Self::new(mixed)
    }

    /// Current internal state (for debugging/testing).
    #[inline]
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next random u64.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = splitmix64_next(self.state);
        splitmix64_mix(self.state)
    }

    /// Generate a uniform f64 in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        u64_to_f64_01(self.next_u64())
    }

    /// Generate a uniform f64 in [min, max).
    #[inline]
    pub fn uniform_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.uniform() * (max - min)
    }

    /// Generate a standard normal value via the Box-Muller transform.
    #[inline]
    pub fn normal(&mut self) -> f64 {
        let u1 = self.uniform();
        let u2 = self.uniform();
        // Avoid log(0)
        let u1 = if u1 == 0.0 { f64::MIN_POSITIVE } else { u1 };
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Generate a normal value with the given mean and standard deviation.
    #[inline]
    pub fn normal_with(&mut self, mean: f64, stddev: f64) -> f64 {
        mean + self.normal() * stddev
    }

    /// Select an index based on weights (inverse-CDF on a uniform draw).
    ///
    /// Weights do not need to sum to 1. Non-positive totals select index 0.
    #[inline]
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        if weights.is_empty() {
            return 0;
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }

        let threshold = self.uniform() * total;
        let mut cumulative = 0.0;

        for (i, &weight) in weights.iter().enumerate() {
            cumulative += weight;
            if threshold < cumulative {
                return i;
            }
        }

        // Floating point edge case: fall back to the last index
        weights.len() - 1
    }
}

/// SplitMix64 state transition.
#[inline]
const fn splitmix64_next(state: u64) -> u64 {
    state.wrapping_add(0x9E3779B97F4A7C15)
}

/// SplitMix64 output mixing, also used for deriving new states.
#[inline]
const fn splitmix64_mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Convert a u64 to a uniform f64 in [0, 1) using the upper 53 bits.
#[inline]
const fn u64_to_f64_01(x: u64) -> f64 {
    (x >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}
