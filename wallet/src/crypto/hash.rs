// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Hashing
//!
//! BLAKE3 is the one hash function the wallet core uses. It produces the
//! canonical 32-byte signing hash over a transaction's serialized bytes,
//! and it is what the genesis hash constant refers to.
//!
//! BLAKE3 over SHA-256 because it is faster on every platform that matters
//! and there is no external system here demanding SHA-256 compatibility.

/// Compute the BLAKE3 hash of the input data.
///
/// Returns a 32-byte digest as a fixed-size array. Deterministic, of course
/// — two calls over the same bytes always agree, which is what makes the
/// transaction signing hash canonical.
///
/// # Example
///
/// ```
/// use obol_wallet::crypto::blake3_hash;
///
/// let digest = blake3_hash(b"obol");
/// assert_eq!(digest.len(), 32);
/// assert_eq!(digest, blake3_hash(b"obol"));
/// ```
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Decode a hex-encoded 32-byte digest, e.g. the genesis hash constant.
///
/// Returns `None` if the input is not exactly 64 hex characters. Callers
/// holding a compile-time constant may treat `None` as unreachable, but the
/// function doesn't panic on their behalf.
pub fn digest_from_hex(s: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(s).ok()?;
    bytes.as_slice().try_into().ok()
}
