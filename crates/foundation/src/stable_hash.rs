//! Stable hashing for deterministic seed derivation.
//!
//! Every derived RNG stream in cascade is a deterministic function of the run
//! seed and a semantic label (typically a node id). These helpers provide a
//! stable FNV-1a 64-bit implementation so that derivation never depends on
//! the platform or the standard library's randomized hashers.
//!
//! NOTE: FNV-1a is **not** cryptographically secure. It is used strictly for
//! stable identifiers and deterministic stream derivation.

/// 64-bit FNV-1a offset basis.
pub const FNV1A_OFFSET_BASIS_64: u64 = 0xcbf29ce484222325;
/// 64-bit FNV-1a prime.
pub const FNV1A_PRIME_64: u64 = 0x0000_0100_0000_01B3;

/// Mix bytes into an existing FNV-1a 64-bit hash state.
///
/// For each byte: XOR it into the hash, then multiply by the FNV prime.
/// Use [`FNV1A_OFFSET_BASIS_64`] as the initial state for a fresh hash.
#[inline]
pub const fn fnv1a64_mix(mut hash: u64, bytes: &[u8]) -> u64 {
    let mut i = 0usize;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV1A_PRIME_64);
        i += 1;
    }
    hash
}

/// Hash an arbitrary byte slice with FNV-1a 64-bit.
#[inline]
pub const fn fnv1a64(bytes: &[u8]) -> u64 {
    fnv1a64_mix(FNV1A_OFFSET_BASIS_64, bytes)
}

/// Hash a UTF-8 string with FNV-1a 64-bit.
#[inline]
pub const fn fnv1a64_str(s: &str) -> u64 {
    fnv1a64(s.as_bytes())
}
