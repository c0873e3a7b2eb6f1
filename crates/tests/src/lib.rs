//! Test harness for end-to-end cascade runs.
//!
//! Wraps model construction, propagation and sensitivity analysis behind a
//! few helpers so integration tests read as scenarios rather than plumbing.
//! Every harness is seeded; tests never depend on ambient randomness.

use indexmap::IndexMap;

use cascade_engine::{PropagationOutcome, SimulationConfig, propagate};
use cascade_foundation::NodeId;
use cascade_model::Model;
use cascade_sensitivity::{SensitivityReport, analyze};

/// A seeded model-plus-config bundle for scenario tests.
pub struct TestHarness {
    pub model: Model,
    pub config: SimulationConfig,
}

impl TestHarness {
    /// Harness with the default sample count and a fixed seed.
    pub fn new(model: Model) -> Self {
        Self { model, config: SimulationConfig::seeded(0xCA5CADE) }
    }

    /// Harness drawing `sample_count` samples per node.
    pub fn with_samples(model: Model, sample_count: usize) -> Self {
        Self {
            model,
            config: SimulationConfig { sample_count, ..SimulationConfig::seeded(0xCA5CADE) },
        }
    }

    /// Propagate with no interventions.
    ///
    /// # Panics
    ///
    /// Panics if propagation fails; scenario models are well formed by
    /// construction.
    pub fn baseline(&self) -> PropagationOutcome {
        propagate(&self.model, &IndexMap::new(), &self.config).expect("propagation failed")
    }

    /// Propagate with the given interventions.
    pub fn intervene(&self, interventions: &[(&str, f64)]) -> PropagationOutcome {
        let interventions: IndexMap<NodeId, f64> =
            interventions.iter().map(|&(id, v)| (id.into(), v)).collect();
        propagate(&self.model, &interventions, &self.config).expect("propagation failed")
    }

    /// Run the sensitivity analyzer.
    pub fn analyze(&self) -> SensitivityReport {
        analyze(&self.model, &self.config).expect("analysis failed")
    }

    /// Empirical mean of a node's samples in an outcome.
    pub fn mean_of(outcome: &PropagationOutcome, id: &str) -> f64 {
        let samples = &outcome.samples[&NodeId::from(id)];
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Empirical variance of a node's samples in an outcome.
    pub fn variance_of(outcome: &PropagationOutcome, id: &str) -> f64 {
        let samples = &outcome.samples[&NodeId::from(id)];
        let mean = Self::mean_of(outcome, id);
        samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / samples.len() as f64
    }
}
