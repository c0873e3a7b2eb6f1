//! End-to-end scenarios for the cascade pipeline.
//!
//! These tests verify the full path: build model -> propagate -> stabilize
//! -> summarize, plus the sensitivity analyzer on top. Scenario models are
//! small and seeded, with tolerances sized to Monte Carlo error at the
//! chosen sample counts.

use cascade_foundation::NodeId;
use cascade_model::{CircuitBreakers, Distribution, Edge, Effect, Model, Node, NodeKind};
use cascade_sensitivity::render_markdown;
use cascade_tests::TestHarness;

fn normal(mean: f64, std_dev: f64) -> Distribution {
    Distribution::Normal { mean, std_dev }
}

fn linear_chain() -> Model {
    Model::new("chain")
        .with_node(Node::new("a", NodeKind::Exogenous, normal(10.0, 1.0)))
        .with_node(Node::new("b", NodeKind::Endogenous, normal(5.0, 0.5)))
        .with_edge(Edge::new("a", "b", Effect::linear(0.5)))
}

/// Two-node chain with a Linear effect: the unintervened child stays at its
/// prior mean, and a 20% parent increase at coefficient 0.5 lifts it 10%.
#[test]
fn linear_chain_baseline_and_intervention() {
    let harness = TestHarness::with_samples(linear_chain(), 1000);

    let baseline = harness.baseline();
    let b_mean = TestHarness::mean_of(&baseline, "b");
    assert!((b_mean - 5.0).abs() < 0.1, "baseline child mean {b_mean}");

    let intervened = harness.intervene(&[("a", 12.0)]);
    let b_mean = TestHarness::mean_of(&intervened, "b");
    assert!((b_mean - 5.5).abs() < 0.1, "intervened child mean {b_mean}");
}

/// Multiplicative compounding: one doubling multiplies the child by the
/// factor, three doublings by the factor cubed (still inside the clamp).
#[test]
fn multiplicative_compounding() {
    let model = Model::new("compounding")
        .with_node(Node::new("a", NodeKind::Exogenous, normal(50.0, 2.0)))
        .with_node(Node::new("b", NodeKind::Endogenous, normal(100.0, 5.0)))
        .with_edge(Edge::new(
            "a",
            "b",
            Effect::Multiplicative { factor: 2.0, baseline: 50.0 },
        ));
    let harness = TestHarness::with_samples(model, 1000);

    let one_doubling = harness.intervene(&[("a", 100.0)]);
    let b_mean = TestHarness::mean_of(&one_doubling, "b");
    assert!((b_mean - 200.0).abs() < 2.0, "one doubling: {b_mean}");

    let three_doublings = harness.intervene(&[("a", 400.0)]);
    let b_mean = TestHarness::mean_of(&three_doublings, "b");
    assert!((b_mean - 800.0).abs() < 5.0, "three doublings: {b_mean}");
}

/// Threshold regime change: sensitivity below the cutoff differs from
/// sensitivity above it.
#[test]
fn threshold_regime_change() {
    let model = Model::new("regimes")
        .with_node(Node::new("a", NodeKind::Exogenous, normal(50.0, 2.0)))
        .with_node(Node::new("b", NodeKind::Endogenous, normal(100.0, 5.0)))
        .with_edge(Edge::new(
            "a",
            "b",
            Effect::Threshold { cutoff: 80.0, below: 0.2, above: 0.7, smoothness: 2.0 },
        ));
    let harness = TestHarness::with_samples(model, 1000);

    // Below the cutoff: eff ~= 0.2, deviation -0.5, multiplier ~= 0.9
    let below = harness.intervene(&[("a", 40.0)]);
    let b_mean = TestHarness::mean_of(&below, "b");
    assert!((b_mean - 90.0).abs() < 2.0, "below-regime mean {b_mean}");

    // Above: eff ~= 0.7, deviation 0.5, multiplier ~= 1.35
    let above = harness.intervene(&[("a", 120.0)]);
    let b_mean = TestHarness::mean_of(&above, "b");
    assert!((b_mean - 135.0).abs() < 2.0, "above-regime mean {b_mean}");
}

/// Intervening downstream must not move anything upstream: with per-node
/// RNG streams the upstream samples are bit-identical to the baseline.
#[test]
fn downstream_intervention_leaves_upstream_untouched() {
    let model = Model::new("three-chain")
        .with_node(Node::new("a", NodeKind::Exogenous, normal(10.0, 1.0)))
        .with_node(Node::new("b", NodeKind::Endogenous, normal(5.0, 0.5)))
        .with_node(Node::new("c", NodeKind::Terminal, normal(2.0, 0.2)))
        .with_edge(Edge::new("a", "b", Effect::linear(0.5)))
        .with_edge(Edge::new("b", "c", Effect::linear(0.3)));
    let harness = TestHarness::new(model);

    let baseline = harness.baseline();
    let intervened = harness.intervene(&[("c", 42.0)]);

    let c_id = NodeId::from("c");
    for id in ["a", "b"] {
        let id = NodeId::from(id);
        assert_eq!(baseline.samples[&id], intervened.samples[&id], "upstream node {id} moved");
    }
    assert!(intervened.samples[&c_id].iter().all(|&v| v == 42.0));
}

/// Circuit breakers hold even when the incoming effect pushes hard against
/// them, and variance clamping does not reintroduce excursions.
#[test]
fn circuit_breakers_bound_the_result() {
    let model = Model::new("bounded")
        .with_node(Node::new("a", NodeKind::Exogenous, normal(100.0, 40.0)))
        .with_node(
            Node::new("b", NodeKind::Endogenous, normal(50.0, 60.0)).with_breakers(
                CircuitBreakers { min: Some(0.0), max: Some(100.0), ..Default::default() },
            ),
        )
        .with_edge(Edge::new("a", "b", Effect::linear(3.0)));
    let harness = TestHarness::with_samples(model, 1000);

    let outcome = harness.baseline();
    let b = &outcome.samples[&NodeId::from("b")];
    assert!(b.iter().all(|&v| (0.0..=100.0).contains(&v)));
}

/// Bottleneck diagnosis: a near-inert interior coupling attenuates an
/// otherwise strong chain, and the analyzer names the culprit.
#[test]
fn bottleneck_is_diagnosed_at_the_interior_node() {
    let model = Model::new("bottleneck")
        .with_node(Node::new("x", NodeKind::Exogenous, normal(100.0, 1.0)))
        .with_node(Node::new("m", NodeKind::Endogenous, normal(50.0, 0.5)))
        .with_node(Node::new("y", NodeKind::Terminal, normal(200.0, 1.0)))
        .with_edge(Edge::new("x", "m", Effect::linear(0.01)))
        .with_edge(Edge::new("m", "y", Effect::linear(1.0)));
    let harness = TestHarness::new(model);

    let report = harness.analyze();

    let warning = report
        .summary
        .bottlenecks
        .iter()
        .find(|w| w.source_id == "x".into())
        .expect("bottleneck warning for x");
    assert_eq!(warning.terminal_id, "y".into());
    assert!(warning.terminal_pct_change.abs() < 10.0);
    assert_eq!(warning.suspected_bottleneck, Some("m".into()));
}

/// Universal invariants: every sample vector is finite and full length,
/// across all distribution families flowing through the engine.
#[test]
fn sample_vectors_are_always_finite_and_full_length() {
    let model = Model::new("menagerie")
        .with_node(Node::new("spend", NodeKind::Exogenous, Distribution::Lognormal {
            mu: 3.0,
            sigma: 0.4,
        }))
        .with_node(Node::new("conv", NodeKind::Exogenous, Distribution::Beta {
            alpha: 2.0,
            beta: 8.0,
        }))
        .with_node(Node::new("latency", NodeKind::Exogenous, Distribution::Gamma {
            shape: 3.0,
            rate: 0.5,
        }))
        .with_node(Node::new("eta", NodeKind::Exogenous, Distribution::Bounded {
            min: 1.0,
            max: 9.0,
            mode: 3.0,
        }))
        .with_node(Node::new("tickets", NodeKind::Exogenous, Distribution::Count {
            lambda: 12.0,
        }))
        .with_node(Node::new("flag", NodeKind::Exogenous, Distribution::Binary { p: 0.4 }))
        .with_node(Node::new("tier", NodeKind::Exogenous, Distribution::Categorical {
            probs: vec![0.5, 0.3, 0.2],
        }))
        .with_node(Node::new("signups", NodeKind::Endogenous, normal(100.0, 10.0)))
        .with_node(Node::new("revenue", NodeKind::Terminal, normal(1000.0, 100.0)))
        .with_edge(Edge::new("spend", "signups", Effect::linear(0.4)))
        .with_edge(Edge::new("conv", "signups", Effect::linear(0.6)))
        .with_edge(Edge::new("latency", "signups", Effect::linear(-0.2)))
        .with_edge(Edge::new("signups", "revenue", Effect::Multiplicative {
            factor: 1.8,
            baseline: 100.0,
        }))
        .with_edge(Edge::new("tickets", "revenue", Effect::linear(-0.1)));
    let harness = TestHarness::with_samples(model, 250);

    let outcome = harness.baseline();
    assert_eq!(outcome.samples.len(), 9);
    for (id, samples) in &outcome.samples {
        assert_eq!(samples.len(), 250, "node {id}");
        assert!(samples.iter().all(|v| v.is_finite()), "node {id} has non-finite samples");
    }
    assert_eq!(outcome.summaries.len(), 9);
    for summary in outcome.summaries.values() {
        assert_eq!(summary.points.len(), 51);
    }
}

/// An intervened node has exactly zero variance at the intervention value.
#[test]
fn intervention_zeroes_variance() {
    let harness = TestHarness::new(linear_chain());
    let outcome = harness.intervene(&[("a", 10.0)]);

    assert_eq!(TestHarness::mean_of(&outcome, "a"), 10.0);
    assert_eq!(TestHarness::variance_of(&outcome, "a"), 0.0);
}

/// Intervening a node at its own analytic prior mean leaves downstream
/// summaries close to the unintervened baseline.
#[test]
fn intervening_at_prior_mean_approximates_baseline() {
    let harness = TestHarness::with_samples(linear_chain(), 1000);

    let baseline = harness.baseline();
    let pinned = harness.intervene(&[("a", 10.0)]);

    let baseline_b = TestHarness::mean_of(&baseline, "b");
    let pinned_b = TestHarness::mean_of(&pinned, "b");
    assert!(
        (baseline_b - pinned_b).abs() < 0.15,
        "baseline {baseline_b} vs pinned {pinned_b}"
    );
}

/// Seeded runs are exactly reproducible.
#[test]
fn seeded_runs_repeat_exactly() {
    let harness = TestHarness::new(linear_chain());

    let first = harness.baseline();
    let second = harness.baseline();
    assert_eq!(first.samples, second.samples);

    let first = harness.analyze();
    let second = harness.analyze();
    assert_eq!(first.results, second.results);
    assert_eq!(first.summary, second.summary);
}

/// Terminal interventions are accepted: no downstream effect, but the node's
/// variance collapses, which callers may observe.
#[test]
fn terminal_intervention_is_accepted() {
    let harness = TestHarness::new(linear_chain());
    let outcome = harness.intervene(&[("b", 7.0)]);

    assert_eq!(TestHarness::variance_of(&outcome, "b"), 0.0);
    assert_eq!(TestHarness::mean_of(&outcome, "b"), 7.0);
}

/// Full pipeline from a JSON document: parse, validate, propagate, analyze,
/// render.
#[test]
fn json_document_end_to_end() {
    let json = r#"{
        "title": "Acquisition funnel",
        "nodes": [
            {"id": "ad_spend", "label": "Ad spend", "type": "exogenous", "units": "USD",
             "distribution": {"type": "lognormal", "mu": 7.0, "sigma": 0.3}},
            {"id": "signups", "label": "Signups", "type": "mediator",
             "distribution": {"type": "normal", "mean": 500.0, "stdDev": 50.0}},
            {"id": "revenue", "label": "Revenue", "type": "terminal", "units": "USD",
             "distribution": {"type": "normal", "mean": 20000.0, "stdDev": 2000.0},
             "circuitBreakers": {"min": 0.0}}
        ],
        "edges": [
            {"source": "ad_spend", "target": "signups", "relationship": "increases",
             "effect": {"type": "linear", "coefficient": 0.6, "saturation": 1.5}},
            {"source": "signups", "target": "revenue", "relationship": "increases",
             "effect": {"type": "linear", "coefficient": 0.9}}
        ],
        "keyInsights": ["spend drives revenue through signups"]
    }"#;

    let model = Model::from_json(json).unwrap();
    let harness = TestHarness::new(model);

    let outcome = harness.baseline();
    assert!(outcome.samples[&NodeId::from("revenue")].iter().all(|&v| v >= 0.0));

    let report = harness.analyze();
    assert_eq!(report.model_title, "Acquisition funnel");
    assert_eq!(report.results.len(), 1, "one exogenous source");
    assert_eq!(report.results[0].runs.len(), 4);

    let markdown = render_markdown(&report);
    assert!(markdown.contains("# Sensitivity Analysis: Acquisition funnel"));
    assert!(markdown.contains("## Detailed Results"));
    assert!(markdown.contains("Ad spend"));
}
