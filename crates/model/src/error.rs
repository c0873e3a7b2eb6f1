//! Model errors.

use thiserror::Error;

use cascade_foundation::NodeId;

/// Result type for model loading and validation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while loading or validating a model document.
///
/// These are the structural faults of the error taxonomy: they abort before
/// propagation and are never recovered locally.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to parse model document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("edge references unknown source node: {0}")]
    UnknownSource(NodeId),

    #[error("edge references unknown target node: {0}")]
    UnknownTarget(NodeId),

    #[error("self-referencing edge on node: {0}")]
    SelfLoop(NodeId),
}
