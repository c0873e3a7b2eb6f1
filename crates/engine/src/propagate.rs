//! The propagation engine.
//!
//! Runs one interventional forward simulation: nodes are visited in
//! topological order; each produces its sample vector by one of three modes
//! (intervened constant, prior draw, or base draw transformed through the
//! in-edge kernels), is stabilized, and finally summarized.
//!
//! Sample-index correlation is the one non-obvious invariant: index `i` of a
//! child is computed only from index `i` of each parent's already
//! materialized vector, never from fresh parent draws. Each node's RNG is a
//! substream derived from the run seed and the node id, so the draw a node
//! makes does not depend on how many draws other nodes made before it.

use indexmap::IndexMap;
use tracing::{debug, instrument, trace, warn};

use cascade_foundation::{NodeId, RngStream};
use cascade_model::Model;

use crate::config::SimulationConfig;
use crate::dag::topological_order;
use crate::error::Result;
use crate::kernel::apply_effect;
use crate::sampler::sample_distribution;
use crate::stabilize::{apply_circuit_breakers, clamp_variance, max_std_dev_ratio};
use crate::summary::{DistributionSummary, summarize};

/// Result of one propagation: a sample vector and a summary per node, keyed
/// in topological order.
#[derive(Debug, Clone)]
pub struct PropagationOutcome {
    pub samples: IndexMap<NodeId, Vec<f64>>,
    pub summaries: IndexMap<NodeId, DistributionSummary>,
}

/// Propagate the model forward under the given interventions.
///
/// Intervened nodes produce a constant vector of the intervention value and
/// bypass stabilization entirely; the user's override is authoritative.
/// Interventions naming unknown nodes are dropped with a warning.
///
/// Structural faults (ill-formed model, cycle) return an error before any
/// sampling; numeric faults during the run are recovered locally, so a well
/// formed model always yields finite, full-length sample vectors.
#[instrument(skip_all, fields(nodes = model.nodes.len(), interventions = interventions.len()))]
pub fn propagate(
    model: &Model,
    interventions: &IndexMap<NodeId, f64>,
    config: &SimulationConfig,
) -> Result<PropagationOutcome> {
    model.validate()?;
    let order = topological_order(model)?;

    let sample_count = config.effective_sample_count();
    let seed = config.resolved_seed();
    let limits = config.effect_limits();
    let breaker_defaults = config.breaker_defaults();
    let prior_means = model.prior_means();

    let mut active: IndexMap<NodeId, f64> = IndexMap::new();
    for (id, &value) in interventions {
        let Some(node) = model.node(id) else {
            warn!(node = %id, value, "intervention targets unknown node, ignored");
            continue;
        };
        let value = if value.is_finite() {
            value
        } else {
            let substitute = node.distribution.mean();
            warn!(node = %id, "non-finite intervention value replaced by prior mean");
            substitute
        };
        active.insert(node.id.clone(), value);
    }

    let mut samples: IndexMap<NodeId, Vec<f64>> = IndexMap::with_capacity(order.len());

    for id in &order {
        let node = model.node(id).expect("topological order only emits model nodes");
        let prior_mean = prior_means[id];

        let vector = if let Some(&value) = active.get(id) {
            debug!(node = %id, value, "intervened");
            vec![value; sample_count]
        } else {
            let mut rng = RngStream::derive(seed, id.as_str());
            let mut vector = sample_distribution(&node.distribution, sample_count, &mut rng);

            if !model.is_source(node) {
                let mut in_edges = model.in_edges(id);
                // Stable application order: by source id, then edge position
                in_edges.sort_by(|(ia, a), (ib, b)| a.source.cmp(&b.source).then(ia.cmp(ib)));

                for (_, edge) in &in_edges {
                    let parent_samples = &samples[&edge.source];
                    let parent_prior = prior_means[&edge.source];
                    trace!(node = %id, parent = %edge.source, effect = edge.effect.kind_name(), "applying effect");

                    for (value, &parent) in vector.iter_mut().zip(parent_samples) {
                        *value = apply_effect(*value, &edge.effect, parent, parent_prior, &limits);
                    }
                }
            }

            let breakers = node.circuit_breakers.as_ref();
            apply_circuit_breakers(&mut vector, breakers, prior_mean, &breaker_defaults);
            clamp_variance(&mut vector, max_std_dev_ratio(breakers, &breaker_defaults));
            vector
        };

        samples.insert(id.clone(), vector);
    }

    let summaries = samples
        .iter()
        .map(|(id, vector)| (id.clone(), summarize(vector, config.kde_point_count)))
        .collect();

    Ok(PropagationOutcome { samples, summaries })
}
