// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Cryptographic Primitives
//!
//! The narrow set of primitives the wallet core actually needs:
//!
//! - **keys** — Ed25519 keypairs for accounts. Deterministic signatures,
//!   32+32 byte keys, no nonce footguns.
//! - **hash** — BLAKE3 for transaction signing hashes. Fast everywhere,
//!   32-byte output.
//! - **encryption** — AES-256-GCM for sealing spending keys at rest in the
//!   in-memory key store.
//!
//! Everything here is deterministic and side-effect-free except key and
//! nonce generation, which draw from `OsRng`.

pub mod encryption;
pub mod hash;
pub mod keys;

pub use encryption::{decrypt, encrypt, EncryptionError};
pub use hash::blake3_hash;
pub use keys::{AccountKeypair, AccountPublicKey, AccountSignature, KeyError};
