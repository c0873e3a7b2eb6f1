//! Cascade Engine
//!
//! Monte Carlo propagation over a causal model: draw a sample vector per
//! node, push each sample index through the edge effect kernels in
//! topological order, stabilize the result, and summarize every node as a
//! kernel density estimate with percentiles.
//!
//! The engine is pure from the caller's viewpoint: it borrows the model
//! read-only, owns nothing beyond the returned result, and all randomness is
//! derived from the run seed, so seeded runs are exactly reproducible.

pub mod config;
pub mod dag;
pub mod error;
pub mod kernel;
pub mod propagate;
pub mod sampler;
pub mod stabilize;
pub mod summary;

pub use config::SimulationConfig;
pub use dag::topological_order;
pub use error::{Error, Result};
pub use kernel::{EffectLimits, apply_effect};
pub use propagate::{PropagationOutcome, propagate};
pub use sampler::sample_distribution;
pub use summary::{DistributionSummary, KdePoint, Percentiles, summarize};
