//! Effect kernels.
//!
//! Each kernel transforms a single child sample given the matching parent
//! sample and the parent's analytic prior mean. Kernels are total functions:
//! non-finite inputs pass the base value through, and a non-finite result is
//! discarded in favor of the base value, so a kernel can never poison a
//! sample vector.

use cascade_model::Effect;

/// Bounds on the multiplier a single effect application may produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectLimits {
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

impl Default for EffectLimits {
    fn default() -> Self {
        Self { min_multiplier: 0.1, max_multiplier: 10.0 }
    }
}

impl EffectLimits {
    fn clamp(&self, multiplier: f64) -> f64 {
        multiplier.clamp(self.min_multiplier, self.max_multiplier)
    }
}

/// Prior means smaller than this in magnitude make relative deviations
/// meaningless; the Linear kernel switches to an additive fallback.
const NEAR_ZERO_PRIOR: f64 = 0.001;

/// Apply one edge effect to one sample.
pub fn apply_effect(
    base: f64,
    effect: &Effect,
    parent_value: f64,
    parent_prior_mean: f64,
    limits: &EffectLimits,
) -> f64 {
    if !base.is_finite() || !parent_value.is_finite() {
        return base;
    }

    let result = match *effect {
        Effect::Linear { coefficient, intercept, saturation } => {
            let scaled = if parent_prior_mean.abs() < NEAR_ZERO_PRIOR {
                base + coefficient * parent_value * 0.01
            } else {
                let mut deviation = (parent_value - parent_prior_mean) / parent_prior_mean;
                if let Some(sat) = saturation
                    && sat > 0.0
                {
                    deviation = sat * (deviation / sat).tanh();
                }
                base * limits.clamp(1.0 + coefficient * deviation)
            };
            scaled + intercept.unwrap_or(0.0)
        }
        Effect::Multiplicative { factor, baseline } => {
            if parent_value <= 0.0 || baseline <= 0.0 {
                return base;
            }
            let doublings = (parent_value / baseline).log2();
            base * limits.clamp(factor.powf(doublings))
        }
        Effect::Threshold { cutoff, below, above, smoothness } => {
            let weight = 1.0 / (1.0 + (-smoothness * (parent_value - cutoff)).exp());
            let sensitivity = below * (1.0 - weight) + above * weight;
            let deviation = (parent_value - cutoff) / cutoff.abs().max(1.0);
            base * limits.clamp(1.0 + sensitivity * deviation)
        }
        Effect::Logistic { coefficient, threshold } => {
            let p = base.clamp(0.001, 0.999);
            let logit = (p / (1.0 - p)).ln();
            let shifted = (logit + coefficient * (parent_value - threshold)).clamp(-10.0, 10.0);
            1.0 / (1.0 + (-shifted).exp())
        }
    };

    if result.is_finite() { result } else { base }
}
