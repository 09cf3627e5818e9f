// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # KeyStore Collaborator Interface
//!
//! The wallet core never stores keys itself — a platform key store does
//! (hardware-backed keystore, secure enclave, or the in-memory
//! [`super::EncryptedKeyStore`] for tests and embedders without one). The
//! core depends on exactly two operations: decrypt a key under an
//! authentication policy, and cancel whatever prompt is currently showing.
//!
//! Every decrypt failure arrives as a [`RejectionCode`] — the narrow waist
//! through which all heterogeneous sensor/hardware failures must pass
//! before the classifier turns them into state machine transitions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AuthPolicy
// ---------------------------------------------------------------------------

/// How the user proves presence before the key store releases a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthPolicy {
    /// Fingerprint / face sensor. The preferred path.
    Biometric,
    /// Device PIN / pattern. The fallback path.
    SystemPin,
}

impl fmt::Display for AuthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Biometric => write!(f, "BIOMETRIC"),
            Self::SystemPin => write!(f, "SYSTEM_PIN"),
        }
    }
}

// ---------------------------------------------------------------------------
// RejectionCode
// ---------------------------------------------------------------------------

/// Why the key store refused to release a key.
///
/// Produced by the biometric/decryption subsystem, consumed by
/// [`super::classifier::classify`]. Platform layers are expected to map any
/// sensor code not listed here to [`Unknown`](Self::Unknown) — the
/// classifier fail-open-retries it rather than aborting the flow on a code
/// nobody anticipated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionCode {
    /// The user (or the owning context) dismissed the prompt.
    Canceled,
    /// The prompt was aborted specifically to re-issue it under the PIN
    /// policy. Internal plumbing — never surfaced as a terminal error.
    SwappedToFallback,
    /// Authentication passed but the stored ciphertext would not decrypt.
    DecryptionFailed,
    /// Too many failed attempts; the sensor is temporarily disabled.
    SensorLockout,
    /// The requested key id does not exist or its material is unusable.
    InvalidKey,
    /// Anything the platform layer could not classify.
    Unknown,
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canceled => write!(f, "CANCELED"),
            Self::SwappedToFallback => write!(f, "SWAPPED_TO_FALLBACK"),
            Self::DecryptionFailed => write!(f, "DECRYPTION_FAILED"),
            Self::SensorLockout => write!(f, "SENSOR_LOCKOUT"),
            Self::InvalidKey => write!(f, "INVALID_KEY"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyAccessRequest
// ---------------------------------------------------------------------------

/// A single attempt to decrypt a stored key.
///
/// Created per invocation and lives for the duration of one authentication
/// attempt; a retry or fallback is a *new* request. The `request_id` exists
/// purely so logs from the gate, the store, and the platform layer can be
/// correlated.
#[derive(Debug, Clone)]
pub struct KeyAccessRequest {
    /// Identifies which stored key to decrypt.
    pub key_id: String,
    /// The authentication policy for this attempt.
    pub policy: AuthPolicy,
    /// Human-readable prompt text ("Authorize this transfer").
    pub reason: String,
    /// Free-form operation context forwarded to the platform prompt.
    pub context: String,
    /// Correlation id for logging. Fresh per request.
    pub request_id: Uuid,
}

impl KeyAccessRequest {
    /// Creates a request with a fresh correlation id and empty context.
    pub fn new(key_id: &str, policy: AuthPolicy, reason: &str) -> Self {
        KeyAccessRequest {
            key_id: key_id.to_string(),
            policy,
            reason: reason.to_string(),
            context: String::new(),
            request_id: Uuid::new_v4(),
        }
    }
}

// ---------------------------------------------------------------------------
// DecryptedKey
// ---------------------------------------------------------------------------

/// Raw key material released by the key store after authentication.
///
/// Exists only between a successful prompt and the completion of signing.
/// The `Debug` impl redacts the bytes — decrypted spending keys do not
/// belong in logs, ever.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptedKey {
    bytes: Vec<u8>,
}

impl DecryptedKey {
    /// Wraps freshly decrypted key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        DecryptedKey { bytes }
    }

    /// Borrow the key material.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the wrapper and take the key material.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for DecryptedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecryptedKey({} bytes, redacted)", self.bytes.len())
    }
}

// ---------------------------------------------------------------------------
// KeyStore trait
// ---------------------------------------------------------------------------

/// The two operations the wallet core requires of a platform key store.
///
/// Each call is a suspension point: the gate awaits `decrypt` to
/// completion before evaluating its next transition, so at most one
/// request is logically in flight per store.
///
/// ## Cancellation contract
///
/// `cancel` and a sensor resolution can race. The store — not the gate —
/// is the authority on who won: it returns `true` if a prompt was actually
/// in flight and has now been pre-empted (the pending `decrypt` will
/// resolve with the supplied code), and `false` if the scan had already
/// finished, in which case the caller handles the resolution itself. The
/// gate trusts this signal rather than re-deriving it.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Prompts for authentication under the request's policy and, on
    /// success, decrypts and releases the named key.
    async fn decrypt(&self, request: &KeyAccessRequest) -> Result<DecryptedKey, RejectionCode>;

    /// Aborts any in-flight prompt, resolving its pending `decrypt` with
    /// `code`. Returns whether a prompt was actually in flight.
    async fn cancel(&self, code: RejectionCode) -> bool;
}
