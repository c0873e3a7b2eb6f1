//! Cascade Model
//!
//! Schema of the causal model document consumed by the simulation engine:
//! nodes with prior distributions and circuit breakers, directed edges with
//! parameterized effects, and pass-through presentation metadata.
//!
//! Models are produced externally (typically by an LLM-backed authoring
//! pipeline) and arrive as JSON. Deserialization rejects unknown distribution
//! and effect tags; [`Model::validate`] catches structural faults (duplicate
//! ids, dangling edge endpoints, self-loops) before any propagation runs.

pub mod distribution;
pub mod edge;
pub mod effect;
pub mod error;
pub mod model;
pub mod node;

pub use cascade_foundation::NodeId;
pub use distribution::Distribution;
pub use edge::Edge;
pub use effect::Effect;
pub use error::{ModelError, ModelResult};
pub use model::Model;
pub use node::{CircuitBreakers, Node, NodeKind};
