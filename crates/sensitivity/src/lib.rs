//! Cascade Sensitivity
//!
//! Diagnoses how interventions on a model's inputs propagate to everything
//! downstream: which couplings are strong, which are inert, which respond
//! asymmetrically to increases versus decreases, and where along a causal
//! path an otherwise strong effect is being attenuated.
//!
//! The analyzer runs one baseline propagation plus four perturbed runs per
//! source node; the runs are independent and execute in parallel.

pub mod analyze;
pub mod report;

pub use analyze::{PERTURBATION_MULTIPLIERS, analyze};
pub use report::{
    AsymmetryFinding, BottleneckWarning, EffectSummary, ImpactRow, PerturbationRun,
    SensitivityReport, SensitivitySummary, SourceResult, render_markdown,
};
