//! The analyzer.
//!
//! One baseline propagation plus four perturbed propagations per source
//! node: the source is fixed to its prior mean scaled by each multiplier,
//! and every reachable node's mean shift is recorded. The perturbation runs
//! are independent, so they execute in parallel; the seed is pinned up front
//! so every run (and any re-run of the analysis) shares the same streams.

use std::collections::HashSet;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, instrument};

use cascade_engine::{PropagationOutcome, Result, SimulationConfig, propagate};
use cascade_foundation::NodeId;
use cascade_model::{Model, Node};

use crate::report::{
    AsymmetryFinding, BottleneckWarning, EffectSummary, ImpactRow, PerturbationRun,
    SensitivityReport, SensitivitySummary, SourceResult,
};

/// Intervention multipliers applied to each source's prior mean, in run
/// order: two decreases, two increases.
pub const PERTURBATION_MULTIPLIERS: [f64; 4] = [0.5, 0.75, 1.25, 1.5];

/// Overall mean shift above which a coupling is reported as strong.
const STRONG_THRESHOLD_PCT: f64 = 5.0;
/// Overall mean shift below which a coupling is reported as weak.
const WEAK_THRESHOLD_PCT: f64 = 1.0;
/// Increase/decrease imbalance above which a coupling is asymmetric.
const ASYMMETRY_RATIO: f64 = 2.0;
/// Terminal response under the strongest increase below which a bottleneck
/// warning is emitted.
const BOTTLENECK_TERMINAL_PCT: f64 = 10.0;
/// Interior response below which a node is named as the suspected bottleneck.
const BOTTLENECK_SUSPECT_PCT: f64 = 5.0;
/// Strong and weak lists are truncated to this many entries.
const MAX_LISTED_EFFECTS: usize = 10;

/// Run the full sensitivity analysis over a model.
#[instrument(skip_all, fields(model = %model.title))]
pub fn analyze(model: &Model, config: &SimulationConfig) -> Result<SensitivityReport> {
    // Pin the seed so the baseline and every perturbation share RNG streams
    let config = SimulationConfig { rng_seed: Some(config.resolved_seed()), ..config.clone() };

    let baseline = propagate(model, &IndexMap::new(), &config)?;
    let baseline_means: IndexMap<NodeId, f64> =
        baseline.samples.iter().map(|(id, samples)| (id.clone(), mean_of(samples))).collect();

    let sources: Vec<&Node> = model.nodes.iter().filter(|n| model.is_source(n)).collect();
    debug!(sources = sources.len(), "perturbing source nodes");

    let jobs: Vec<(&Node, f64)> = sources
        .iter()
        .flat_map(|&node| PERTURBATION_MULTIPLIERS.iter().map(move |&m| (node, m)))
        .collect();

    // Order-preserving parallel fan-out; job i maps back to
    // (source i / 4, multiplier i % 4)
    let outcomes: Vec<(f64, PropagationOutcome)> = jobs
        .par_iter()
        .map(|&(node, multiplier)| {
            let value = node.distribution.mean() * multiplier;
            let interventions: IndexMap<NodeId, f64> =
                [(node.id.clone(), value)].into_iter().collect();
            propagate(model, &interventions, &config).map(|outcome| (value, outcome))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut results = Vec::with_capacity(sources.len());
    let mut strong = Vec::new();
    let mut weak = Vec::new();
    let mut asymmetric = Vec::new();
    let mut bottlenecks = Vec::new();

    for (source_idx, source) in sources.iter().enumerate() {
        let reachable = reachable_from(model, &source.id);
        let mut runs = Vec::with_capacity(PERTURBATION_MULTIPLIERS.len());

        for (m_idx, &multiplier) in PERTURBATION_MULTIPLIERS.iter().enumerate() {
            let (value, outcome) = &outcomes[source_idx * PERTURBATION_MULTIPLIERS.len() + m_idx];

            let impacts = reachable
                .iter()
                .map(|target_id| {
                    let target = model.node(target_id).expect("reachable node exists");
                    let baseline = baseline_means[target_id];
                    let intervened = mean_of(&outcome.samples[target_id]);
                    let absolute_change = intervened - baseline;
                    let pct_change = if baseline == 0.0 {
                        0.0
                    } else {
                        absolute_change / baseline.abs() * 100.0
                    };
                    ImpactRow {
                        node_id: target_id.clone(),
                        node_label: target.label.clone(),
                        baseline,
                        intervened,
                        absolute_change,
                        pct_change,
                        units: target.units.clone(),
                    }
                })
                .collect();

            runs.push(PerturbationRun { multiplier, intervention_value: *value, impacts });
        }

        classify_couplings(source, &runs, model, &mut strong, &mut weak, &mut asymmetric);
        detect_bottlenecks(source, &runs, model, &mut bottlenecks);

        results.push(SourceResult {
            source_id: source.id.clone(),
            source_label: source.label.clone(),
            prior_mean: source.distribution.mean(),
            runs,
        });
    }

    strong.sort_by(|a: &EffectSummary, b: &EffectSummary| {
        b.overall_pct.partial_cmp(&a.overall_pct).unwrap()
    });
    strong.truncate(MAX_LISTED_EFFECTS);
    weak.sort_by(|a: &EffectSummary, b: &EffectSummary| {
        a.overall_pct.partial_cmp(&b.overall_pct).unwrap()
    });
    weak.truncate(MAX_LISTED_EFFECTS);
    asymmetric.truncate(MAX_LISTED_EFFECTS);

    Ok(SensitivityReport {
        model_title: model.title.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        sample_count: config.effective_sample_count(),
        results,
        summary: SensitivitySummary {
            strong_effects: strong,
            weak_effects: weak,
            asymmetric_effects: asymmetric,
            bottlenecks,
        },
    })
}

/// Aggregate each coupling's responses over the four multipliers and sort
/// it into the strong/weak/asymmetric candidate lists.
fn classify_couplings(
    source: &Node,
    runs: &[PerturbationRun],
    model: &Model,
    strong: &mut Vec<EffectSummary>,
    weak: &mut Vec<EffectSummary>,
    asymmetric: &mut Vec<AsymmetryFinding>,
) {
    let Some(first_run) = runs.first() else {
        return;
    };

    for (target_idx, impact) in first_run.impacts.iter().enumerate() {
        let pct_at = |run_idx: usize| runs[run_idx].impacts[target_idx].pct_change.abs();

        // Multiplier order is [0.5, 0.75, 1.25, 1.5]
        let avg_decrease_pct = (pct_at(0) + pct_at(1)) / 2.0;
        let avg_increase_pct = (pct_at(2) + pct_at(3)) / 2.0;
        let overall_pct = (avg_increase_pct + avg_decrease_pct) / 2.0;

        let target_label = model
            .node(&impact.node_id)
            .map(|n| n.label.clone())
            .unwrap_or_default();

        let summary = EffectSummary {
            source_id: source.id.clone(),
            target_id: impact.node_id.clone(),
            target_label,
            avg_increase_pct,
            avg_decrease_pct,
            overall_pct,
        };

        if overall_pct > STRONG_THRESHOLD_PCT {
            strong.push(summary);
        } else if overall_pct < WEAK_THRESHOLD_PCT {
            weak.push(summary);
        }

        if avg_increase_pct > 0.0 && avg_decrease_pct > 0.0 {
            let ratio = avg_increase_pct.max(avg_decrease_pct)
                / avg_increase_pct.min(avg_decrease_pct);
            if ratio > ASYMMETRY_RATIO {
                asymmetric.push(AsymmetryFinding {
                    source_id: source.id.clone(),
                    target_id: impact.node_id.clone(),
                    avg_increase_pct,
                    avg_decrease_pct,
                    ratio,
                });
            }
        }
    }
}

/// Scan the strongest-increase run for terminal nodes that barely moved and
/// name the quietest interior node as the likely attenuator.
fn detect_bottlenecks(
    source: &Node,
    runs: &[PerturbationRun],
    model: &Model,
    bottlenecks: &mut Vec<BottleneckWarning>,
) {
    let Some(strongest) = runs.last() else {
        return;
    };

    let suspect = strongest
        .impacts
        .iter()
        .filter(|impact| !model.is_sink(&impact.node_id))
        .min_by(|a, b| a.pct_change.abs().partial_cmp(&b.pct_change.abs()).unwrap())
        .filter(|impact| impact.pct_change.abs() < BOTTLENECK_SUSPECT_PCT);

    for impact in &strongest.impacts {
        if model.is_sink(&impact.node_id) && impact.pct_change.abs() < BOTTLENECK_TERMINAL_PCT {
            bottlenecks.push(BottleneckWarning {
                source_id: source.id.clone(),
                terminal_id: impact.node_id.clone(),
                terminal_pct_change: impact.pct_change,
                suspected_bottleneck: suspect.map(|s| s.node_id.clone()),
                bottleneck_pct_change: suspect.map(|s| s.pct_change),
            });
        }
    }
}

/// Nodes reachable from `source` by forward BFS, in visit order. The source
/// itself is excluded.
fn reachable_from(model: &Model, source: &NodeId) -> Vec<NodeId> {
    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut queue: Vec<&NodeId> = vec![source];
    let mut order = Vec::new();
    visited.insert(source);

    let mut cursor = 0;
    while cursor < queue.len() {
        let current = queue[cursor];
        cursor += 1;

        for edge in model.out_edges(current) {
            if visited.insert(&edge.target) {
                order.push(edge.target.clone());
                queue.push(&edge.target);
            }
        }
    }

    order
}

fn mean_of(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}
