// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Account Keys
//!
//! Ed25519 keypair handling for Obol accounts. Every account on the ledger
//! is identified by an Ed25519 public key; every witness traces back to the
//! matching secret key.
//!
//! ## Why Ed25519?
//!
//! - Deterministic signatures (no k-value footguns like ECDSA). The same
//!   (key, message) pair always yields the same signature, which is exactly
//!   what the witness determinism property requires.
//! - 128-bit security in 32+32 bytes. Compact and sufficient.
//! - Constant-time implementations exist and are well-audited.
//!
//! ## Security considerations
//!
//! - Secret keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key bytes are never logged. The `Debug` impl prints the public half
//!   only. If you add key-material logging to this module, you will be
//!   asked to leave.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed — leaking details about
/// key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An account spending keypair.
///
/// This is what the key store guards and what the signer consumes. The
/// secret half authorizes every outgoing transfer, so it only ever exists
/// in memory between a successful authentication and the completion of
/// signing.
///
/// `AccountKeypair` intentionally does NOT implement `Serialize` /
/// `Deserialize`. Serializing a secret key should be a deliberate act —
/// use `to_bytes()` / `from_secret_bytes()` explicitly, and then use the
/// encrypted key store rather than writing the result anywhere.
pub struct AccountKeypair {
    signing_key: SigningKey,
}

/// The public half of an account, safe to share with the world.
///
/// Doubles as the account identifier: the single address and the account
/// input reference are both derived from these 32 bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message. 64 bytes, deterministic for a given
/// (key, message) pair.
///
/// Stored as `Vec<u8>` for serde compatibility, but always exactly 64 bytes
/// when produced by [`AccountKeypair::sign`]. A malformed signature never
/// panics — verification just returns `false`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSignature {
    bytes: Vec<u8>,
}

impl AccountKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the 32-byte secret key *is* the seed. Useful for deriving
    /// keypairs from KDF output or recovered secrets. A weak seed gives a
    /// weak key — feed this from a CSPRNG or proper KDF only.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Reconstructs a keypair from raw secret key material of unchecked
    /// length, e.g. bytes freshly decrypted out of the key store.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&arr))
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> AccountPublicKey {
        AccountPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Sign a message.
    ///
    /// Ed25519 signatures are deterministic — no randomness is consumed at
    /// signing time, so a broken RNG cannot leak the key here.
    pub fn sign(&self, message: &[u8]) -> AccountSignature {
        let sig = self.signing_key.sign(message);
        AccountSignature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &AccountSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** This is the only secret standing
    /// between an attacker and the account's funds. Don't log it, don't
    /// persist it unencrypted — hand it to the encrypted key store.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for AccountKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a secret key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for AccountKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even partially.
        write!(f, "AccountKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for AccountKeypair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material in a non-constant-time way is a bad habit, and for identity
    /// purposes the public key is what matters.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for AccountKeypair {}

// ---------------------------------------------------------------------------
// AccountPublicKey
// ---------------------------------------------------------------------------

impl AccountPublicKey {
    /// Create a public key from raw bytes without point validation.
    ///
    /// For bytes of trusted provenance (derived from our own signing key,
    /// or already validated). External input should go through
    /// [`try_from_slice`](Self::try_from_slice).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Try to create a public key from an untrusted byte slice.
    ///
    /// Validates the length and that the bytes decode to a valid Ed25519
    /// point. Low-order and otherwise degenerate points are rejected.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns a boolean rather than a `Result` because callers just want
    /// a yes/no answer; the specific failure mode is none of their business.
    pub fn verify(&self, message: &[u8], signature: &AccountSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Hex-encoded representation. 64 characters for 32 bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse a hex-encoded public key string.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }
}

impl Hash for AccountPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for AccountPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AccountPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// AccountSignature
// ---------------------------------------------------------------------------

impl AccountSignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-encoded signature string. 128 characters for a valid signature.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for AccountSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AccountSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 128 {
            write!(f, "AccountSignature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "AccountSignature({})", hex_str)
        }
    }
}
