//! Engine errors.
//!
//! Only structural faults surface as errors: a cycle in the graph or an
//! ill-formed model document. Parametric and numeric faults inside a run are
//! recovered locally with safe substitutes and never abort a propagation.

use thiserror::Error;

use cascade_foundation::NodeId;
use cascade_model::ModelError;

/// Engine result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Engine errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cycle detected in causal graph involving: {nodes:?}")]
    CycleDetected { nodes: Vec<NodeId> },

    #[error(transparent)]
    Model(#[from] ModelError),
}
