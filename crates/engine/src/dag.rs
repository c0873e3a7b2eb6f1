//! Topological ordering.
//!
//! Kahn's algorithm over the model's adjacency. Ties within a frontier are
//! broken by sorting on node id, so the emission order is a pure function of
//! the model and runs stay reproducible under a fixed seed.

use indexmap::IndexMap;
use tracing::trace;

use cascade_foundation::NodeId;
use cascade_model::Model;

use crate::error::{Error, Result};

/// Order the model's nodes so every node appears after all of its parents.
///
/// Returns [`Error::CycleDetected`] naming the unresolvable nodes if the
/// graph is not acyclic.
pub fn topological_order(model: &Model) -> Result<Vec<NodeId>> {
    let mut in_degree: IndexMap<&NodeId, usize> =
        model.nodes.iter().map(|n| (&n.id, 0)).collect();
    let mut successors: IndexMap<&NodeId, Vec<&NodeId>> = IndexMap::new();

    for edge in &model.edges {
        if let Some(degree) = in_degree.get_mut(&edge.target) {
            *degree += 1;
        }
        successors.entry(&edge.source).or_default().push(&edge.target);
    }

    let mut frontier: Vec<&NodeId> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut order = Vec::with_capacity(model.nodes.len());

    while !frontier.is_empty() {
        // Deterministic tie-break within a frontier
        frontier.sort();

        let mut next_frontier = Vec::new();
        for id in frontier.drain(..) {
            trace!(node = %id, "emitted");
            order.push(id.clone());

            if let Some(children) = successors.get(id) {
                for &child in children {
                    let degree = in_degree.get_mut(child).expect("edge target exists");
                    *degree -= 1;
                    if *degree == 0 {
                        next_frontier.push(child);
                    }
                }
            }
        }
        frontier = next_frontier;
    }

    if order.len() != model.nodes.len() {
        let mut nodes: Vec<NodeId> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree > 0)
            .map(|(&id, _)| id.clone())
            .collect();
        nodes.sort();
        return Err(Error::CycleDetected { nodes });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_model::{Distribution, Edge, Effect, Node, NodeKind};

    fn node(id: &str) -> Node {
        Node::new(id, NodeKind::Endogenous, Distribution::Normal { mean: 0.0, std_dev: 1.0 })
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge::new(source, target, Effect::linear(0.1))
    }

    #[test]
    fn orders_chain() {
        let model = Model::new("chain")
            .with_node(node("c"))
            .with_node(node("a"))
            .with_node(node("b"))
            .with_edge(edge("a", "b"))
            .with_edge(edge("b", "c"));

        let order = topological_order(&model).unwrap();
        assert_eq!(order, vec!["a".into(), "b".into(), "c".into()]);
    }

    #[test]
    fn parents_precede_children_in_diamond() {
        let model = Model::new("diamond")
            .with_node(node("a"))
            .with_node(node("b"))
            .with_node(node("c"))
            .with_node(node("d"))
            .with_edge(edge("a", "b"))
            .with_edge(edge("a", "c"))
            .with_edge(edge("b", "d"))
            .with_edge(edge("c", "d"));

        let order = topological_order(&model).unwrap();
        let pos =
            |id: &str| order.iter().position(|n| n.as_str() == id).unwrap();

        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn frontier_ties_sort_by_id() {
        let model = Model::new("ties")
            .with_node(node("zeta"))
            .with_node(node("alpha"))
            .with_node(node("mid"));

        let order = topological_order(&model).unwrap();
        assert_eq!(order, vec!["alpha".into(), "mid".into(), "zeta".into()]);
    }

    #[test]
    fn detects_cycle() {
        let model = Model::new("cycle")
            .with_node(node("a"))
            .with_node(node("b"))
            .with_node(node("c"))
            .with_edge(edge("a", "b"))
            .with_edge(edge("b", "c"))
            .with_edge(edge("c", "a"));

        match topological_order(&model) {
            Err(Error::CycleDetected { nodes }) => {
                assert_eq!(nodes, vec!["a".into(), "b".into(), "c".into()]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn cycle_report_excludes_clean_prefix() {
        let model = Model::new("partial")
            .with_node(node("clean"))
            .with_node(node("x"))
            .with_node(node("y"))
            .with_edge(edge("x", "y"))
            .with_edge(edge("y", "x"));

        match topological_order(&model) {
            Err(Error::CycleDetected { nodes }) => {
                assert_eq!(nodes, vec!["x".into(), "y".into()]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }
}
