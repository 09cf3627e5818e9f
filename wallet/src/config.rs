// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Network Constants
//!
//! Every magic number the wallet core needs lives here. The fee schedule and
//! genesis hash are network-wide parameters published with the chain config;
//! the values below are the mainnet defaults. Code should take them as
//! explicit arguments (see [`crate::transaction::fee::FeeParameters`]) so
//! tests can run against varied schedules — these constants exist to seed
//! that configuration, not to be reached for from deep inside an algorithm.

/// Hex-encoded hash of the genesis block. Witnesses are domain-separated by
/// this value, so a transaction signed for one network can never replay on
/// another.
pub const GENESIS_HASH_HEX: &str =
    "adbdd5ede31637f6c9bad5c271eec0bc3d0cb9efb86a5b913bb55cba549d0770";

/// Human-readable part for Bech32 addresses on mainnet.
pub const MAINNET_HRP: &str = "obol";

/// Human-readable part for Bech32 addresses on testnet.
pub const TESTNET_HRP: &str = "tobol";

// ---------------------------------------------------------------------------
// Default linear fee schedule
// ---------------------------------------------------------------------------
//
// fee = constant + coefficient * size_bytes (+ certificate_fee per
// certificate; plain transfers carry none). Values are in the smallest
// ledger unit.

/// Flat component of the linear fee.
pub const DEFAULT_FEE_CONSTANT: u64 = 155_381;

/// Per-byte component of the linear fee.
pub const DEFAULT_FEE_COEFFICIENT: u64 = 1;

/// Surcharge per attached certificate. Unused by transfers but part of the
/// published schedule.
pub const DEFAULT_FEE_CERTIFICATE: u64 = 4;

// ---------------------------------------------------------------------------
// Cryptographic parameters
// ---------------------------------------------------------------------------

/// Ed25519 secret key length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// BLAKE3 digest length in bytes. Transaction signing hashes are this long.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// AES-256-GCM key length in bytes (encrypted key store).
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits, the standard GCM size.
pub const AES_NONCE_LENGTH: usize = 12;
