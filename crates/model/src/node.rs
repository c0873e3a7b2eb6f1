//! Nodes and their safety policies.

use serde::{Deserialize, Serialize};

use cascade_foundation::NodeId;

use crate::distribution::Distribution;

/// Structural role of a node within the causal graph.
///
/// Only [`NodeKind::Exogenous`] changes engine behavior (such nodes always
/// draw from their prior); the remaining variants are presentation-level
/// distinctions that the engine treats as endogenous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Exogenous,
    #[default]
    Endogenous,
    Terminal,
    Mediator,
    Moderator,
}

/// Per-node stabilization policy.
///
/// Bounds and variance limits applied after effect propagation. Unset fields
/// fall back to the run configuration's defaults at use time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitBreakers {
    /// Hard lower bound on every sample.
    #[serde(default)]
    pub min: Option<f64>,
    /// Hard upper bound on every sample.
    #[serde(default)]
    pub max: Option<f64>,
    /// Mean-reversion strength in (0, 1]; pulls samples toward the prior
    /// mean. Disabled (0) unless explicitly set.
    #[serde(default)]
    pub prior_weight: Option<f64>,
    /// Cap on the sample stddev as a multiple of |mean|.
    #[serde(default)]
    pub max_std_dev_ratio: Option<f64>,
}

/// A vertex of the causal model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Stylistic grouping; pass-through for the visual layer.
    #[serde(default)]
    pub zone: Option<String>,
    /// Rendering hint; pass-through for the visual layer.
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    pub distribution: Distribution,
    #[serde(default)]
    pub circuit_breakers: Option<CircuitBreakers>,
}

impl Node {
    /// A minimal node for programmatic construction; metadata defaults empty.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, distribution: Distribution) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            description: String::new(),
            kind,
            zone: None,
            shape: None,
            units: None,
            distribution,
            circuit_breakers: None,
        }
    }

    /// Builder method: set the human-readable label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder method: set the units string.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Builder method: attach circuit breakers.
    pub fn with_breakers(mut self, breakers: CircuitBreakers) -> Self {
        self.circuit_breakers = Some(breakers);
        self
    }
}
