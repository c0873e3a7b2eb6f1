//! Directed edges.

use serde::{Deserialize, Serialize};

use cascade_foundation::NodeId;

use crate::effect::Effect;

/// A directed causal arc from `source` to `target`.
///
/// Only `effect` participates in propagation; the remaining fields are
/// authoring and presentation metadata carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    pub effect: Effect,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    /// A bare edge with the given effect and no metadata.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, effect: Effect) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship: None,
            style: None,
            weight: None,
            effect,
            label: None,
        }
    }
}
