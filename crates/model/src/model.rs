//! The model document.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cascade_foundation::NodeId;

use crate::edge::Edge;
use crate::error::{ModelError, ModelResult};
use crate::node::{Node, NodeKind};

/// A complete causal model: nodes, edges and pass-through metadata.
///
/// Treated as immutable during a propagation; the engine borrows it
/// read-only, so concurrent runs over the same model are safe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Visual groupings; ignored by the engine.
    #[serde(default)]
    pub zones: Vec<serde_json::Value>,
    #[serde(default)]
    pub key_insights: Vec<String>,
}

impl Model {
    /// An empty model with the given title, for programmatic construction.
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    /// Builder method: append a node.
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Builder method: append an edge.
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Parse a model from a JSON document and validate its structure.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let model: Model = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Check structural integrity, reporting the first fault found.
    ///
    /// Catches duplicate node ids, edges whose endpoints do not exist, and
    /// self-loops. Acyclicity is checked by the engine's topological sort,
    /// which has to walk the graph anyway.
    pub fn validate(&self) -> ModelResult<()> {
        let mut seen: HashSet<&NodeId> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(ModelError::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &self.edges {
            if !seen.contains(&edge.source) {
                return Err(ModelError::UnknownSource(edge.source.clone()));
            }
            if !seen.contains(&edge.target) {
                return Err(ModelError::UnknownTarget(edge.target.clone()));
            }
            if edge.source == edge.target {
                return Err(ModelError::SelfLoop(edge.source.clone()));
            }
        }

        Ok(())
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// In-edges of a node, paired with their position in the edge list.
    ///
    /// The position makes edge application order reproducible when two
    /// in-edges share a source.
    pub fn in_edges(&self, id: &NodeId) -> Vec<(usize, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| &e.target == id)
            .collect()
    }

    /// Out-edges of a node.
    pub fn out_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| &e.source == id).collect()
    }

    /// Whether a node draws from its prior unconditionally: declared
    /// exogenous, or simply without in-edges.
    pub fn is_source(&self, node: &Node) -> bool {
        node.kind == NodeKind::Exogenous || !self.edges.iter().any(|e| e.target == node.id)
    }

    /// Whether a node has no out-edges (a system output).
    pub fn is_sink(&self, id: &NodeId) -> bool {
        !self.edges.iter().any(|e| &e.source == id)
    }

    /// Analytic prior means of every node, keyed by id in declaration order.
    pub fn prior_means(&self) -> IndexMap<NodeId, f64> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.distribution.mean()))
            .collect()
    }
}
