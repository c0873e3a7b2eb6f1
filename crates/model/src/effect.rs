//! Edge effects.
//!
//! Closed tagged union over the effect functions an edge can carry. Each
//! variant's parameters mirror the authoring schema, with serde defaults for
//! the optional ones. The numeric kernels that apply these effects to sample
//! values live in the engine crate.

use serde::{Deserialize, Serialize};

/// A parameterized effect attached to a directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Effect {
    /// Proportional coupling: the parent's relative deviation from its prior
    /// mean scales the child's value by `1 + coefficient * deviation`.
    Linear {
        #[serde(default = "default_coefficient")]
        coefficient: f64,
        /// Additive offset applied after the multiplier.
        #[serde(default)]
        intercept: Option<f64>,
        /// When set (> 0), deviations are softly capped at this magnitude
        /// via a tanh squash before the multiplier is formed.
        #[serde(default)]
        saturation: Option<f64>,
    },
    /// Exponential scaling: every doubling of the parent over `baseline`
    /// multiplies the child by `factor`.
    Multiplicative {
        #[serde(default = "default_factor")]
        factor: f64,
        #[serde(default = "default_baseline")]
        baseline: f64,
    },
    /// Regime-dependent sensitivity: a sigmoid blend between the `below` and
    /// `above` sensitivities around `cutoff`.
    Threshold {
        cutoff: f64,
        below: f64,
        above: f64,
        #[serde(default = "default_smoothness")]
        smoothness: f64,
    },
    /// Log-odds shift for probability-valued children.
    Logistic { coefficient: f64, threshold: f64 },
}

fn default_coefficient() -> f64 {
    0.3
}

fn default_factor() -> f64 {
    1.5
}

fn default_baseline() -> f64 {
    1.0
}

fn default_smoothness() -> f64 {
    2.0
}

impl Effect {
    /// Short tag name, for log lines and report rows.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Effect::Linear { .. } => "linear",
            Effect::Multiplicative { .. } => "multiplicative",
            Effect::Threshold { .. } => "threshold",
            Effect::Logistic { .. } => "logistic",
        }
    }

    /// A Linear effect with the given coefficient and no intercept or
    /// saturation. Convenience for tests and programmatic model building.
    pub fn linear(coefficient: f64) -> Self {
        Effect::Linear { coefficient, intercept: None, saturation: None }
    }
}
