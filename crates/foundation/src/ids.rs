//! Typed identifiers for cascade entities.
//!
//! Node ids arrive as plain strings in the model document; wrapping them in a
//! newtype keeps sample maps, intervention maps and report rows from mixing
//! up ids with labels or units. Serialization is transparent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node in a causal model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
