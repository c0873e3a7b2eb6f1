//! Cascade Foundation
//!
//! Core utilities shared by every cascade crate: stable hashing,
//! typed node identifiers, and deterministic pseudo-random streams.
//! Everything here is a deterministic consequence of explicit inputs;
//! there is no ambient randomness and no global state.

pub mod ids;
pub mod rng;
pub mod stable_hash;

pub use ids::NodeId;
pub use rng::RngStream;
pub use stable_hash::{FNV1A_OFFSET_BASIS_64, FNV1A_PRIME_64, fnv1a64, fnv1a64_mix, fnv1a64_str};
