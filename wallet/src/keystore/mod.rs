// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Authentication-Gated Key Access
//!
//! The path from "the user tapped Send" to "the spending key is in hand":
//!
//! ```text
//! store.rs       — the KeyStore collaborator trait, request/rejection types
//! classifier.rs  — pure rejection-code -> transition mapping
//! gate.rs        — the KeyAccessGate state machine
//! encrypted.rs   — AES-sealed in-memory KeyStore for tests and embedders
//! ```
//!
//! The gate knows nothing about transactions and the transaction pipeline
//! knows nothing about sensors; the caller composes them, feeding the
//! released key into [`crate::transaction::sign_transaction`].
//!
//! The error surface of this module is exactly `{CANCELED, INVALID_KEY,
//! SENSOR_LOCKOUT, DECRYPTION_FAILED, UNKNOWN}` — `SWAPPED_TO_FALLBACK` is
//! internal plumbing, and unclassified codes are retried (and logged),
//! never surfaced raw.

pub mod classifier;
pub mod encrypted;
pub mod gate;
pub mod store;

pub use classifier::{classify, Disposition};
pub use encrypted::{AlwaysAllow, Authenticator, EncryptedKeyStore};
pub use gate::{GateState, KeyAccessGate};
pub use store::{AuthPolicy, DecryptedKey, KeyAccessRequest, KeyStore, RejectionCode};
