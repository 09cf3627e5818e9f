// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # In-Memory Encrypted Key Store
//!
//! A [`KeyStore`] implementation for embedders without a platform keystore,
//! and for exercising the gate end to end in tests and demos. Spending keys
//! are sealed at rest with AES-256-GCM under a 32-byte device key; the
//! authentication prompt is modeled by a pluggable [`Authenticator`].
//!
//! This store honors the cancellation contract the gate relies on: a code
//! posted through [`cancel`](KeyStore::cancel) while an authorization is in
//! flight pre-empts the result, and the `was_in_flight` return value tells
//! the caller which side won the race.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::AES_KEY_LENGTH;
use crate::crypto::encryption::{decrypt, encrypt, EncryptionError};

use super::store::{DecryptedKey, KeyAccessRequest, KeyStore, RejectionCode};

// ---------------------------------------------------------------------------
// Authenticator
// ---------------------------------------------------------------------------

/// Models the user-presence check a platform keystore performs before
/// releasing key material.
///
/// Implementations decide whether a [`KeyAccessRequest`] passes — a real
/// one would drive a sensor; test ones script outcomes. Rejecting with
/// [`RejectionCode::SwappedToFallback`] or any other code feeds straight
/// into the gate's classification table.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves the prompt for one request.
    async fn authorize(&self, request: &KeyAccessRequest) -> Result<(), RejectionCode>;
}

/// An authenticator that approves everything. For demos and tests where
/// the interesting behavior lives elsewhere.
pub struct AlwaysAllow;

#[async_trait]
impl Authenticator for AlwaysAllow {
    async fn authorize(&self, _request: &KeyAccessRequest) -> Result<(), RejectionCode> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EncryptedKeyStore
// ---------------------------------------------------------------------------

/// AES-256-GCM sealed key storage with a simulated authentication prompt.
///
/// Keys are held in memory only — persistence belongs to the embedding
/// platform, not this crate.
pub struct EncryptedKeyStore<A: Authenticator> {
    device_key: [u8; AES_KEY_LENGTH],
    sealed: Mutex<HashMap<String, Vec<u8>>>,
    authenticator: A,
    /// True while an `authorize` call is pending.
    in_flight: AtomicBool,
    /// A cancellation code posted while authorization was pending; consumed
    /// by the pending `decrypt`, which it pre-empts.
    preempted: Mutex<Option<RejectionCode>>,
}

impl<A: Authenticator> EncryptedKeyStore<A> {
    /// Creates an empty store sealed under `device_key`.
    pub fn new(device_key: [u8; AES_KEY_LENGTH], authenticator: A) -> Self {
        EncryptedKeyStore {
            device_key,
            sealed: Mutex::new(HashMap::new()),
            authenticator,
            in_flight: AtomicBool::new(false),
            preempted: Mutex::new(None),
        }
    }

    /// Seals `secret` under the device key and stores it as `key_id`,
    /// replacing any previous entry.
    pub fn seal(&self, key_id: &str, secret: &[u8]) -> Result<(), EncryptionError> {
        let sealed = encrypt(&self.device_key, secret)?;
        self.sealed.lock().insert(key_id.to_string(), sealed);
        Ok(())
    }

    /// Removes a stored key. Returns whether it existed.
    pub fn remove(&self, key_id: &str) -> bool {
        self.sealed.lock().remove(key_id).is_some()
    }
}

#[async_trait]
impl<A: Authenticator> KeyStore for EncryptedKeyStore<A> {
    async fn decrypt(&self, request: &KeyAccessRequest) -> Result<DecryptedKey, RejectionCode> {
        self.in_flight.store(true, Ordering::SeqCst);
        let auth_result = self.authenticator.authorize(request).await;
        self.in_flight.store(false, Ordering::SeqCst);

        // A cancellation posted while the prompt was showing pre-empts
        // whatever the prompt decided.
        if let Some(code) = self.preempted.lock().take() {
            debug!(request_id = %request.request_id, code = %code, "prompt pre-empted");
            return Err(code);
        }
        auth_result?;

        let sealed = {
            let entries = self.sealed.lock();
            entries
                .get(&request.key_id)
                .cloned()
                .ok_or(RejectionCode::InvalidKey)?
        };
        let plaintext =
            decrypt(&self.device_key, &sealed).map_err(|_| RejectionCode::DecryptionFailed)?;
        Ok(DecryptedKey::new(plaintext))
    }

    async fn cancel(&self, code: RejectionCode) -> bool {
        if self.in_flight.load(Ordering::SeqCst) {
            *self.preempted.lock() = Some(code);
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
