// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # AES-256-GCM Sealing
//!
//! Authenticated encryption for spending keys held by the in-memory key
//! store. AES-256-GCM because it's an AEAD cipher — authentication and
//! encryption in one operation, hardware-accelerated on every modern CPU.
//!
//! ## Nonce management
//!
//! GCM is notoriously unforgiving about nonce reuse: encrypt two messages
//! under the same (key, nonce) and an attacker recovers the XOR of the
//! plaintexts and can forge tags. Our strategy is random 96-bit nonces from
//! `OsRng`; the birthday bound (~2^48 messages per key) is far beyond the
//! handful of keys a wallet seals.
//!
//! ## Wire format
//!
//! [`encrypt`] returns `nonce || ciphertext` as a single `Vec<u8>`. The
//! first 12 bytes are the nonce; the rest is ciphertext plus the 16-byte
//! GCM tag. [`decrypt`] expects the same layout.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH};

/// Errors that can occur during sealing and unsealing.
///
/// Deliberately vague: the difference between "wrong key" and "corrupted
/// ciphertext" is none of the caller's business, and certainly none of an
/// attacker's.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: must be at least {AES_NONCE_LENGTH} bytes")]
    CiphertextTooShort,
}

/// Encrypt plaintext with AES-256-GCM under a random nonce.
///
/// Returns `nonce || ciphertext`. The caller never manages the nonce
/// separately.
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt data previously sealed with [`encrypt`].
///
/// Expects the `nonce || ciphertext` layout. Any tampering with either part
/// fails the GCM tag check and surfaces as [`EncryptionError::DecryptFailed`].
pub fn decrypt(key: &[u8; AES_KEY_LENGTH], sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(AES_NONCE_LENGTH);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}
