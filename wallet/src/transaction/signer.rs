// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Witness Signing
//!
//! Signing is a separate step from building because the spending key may not
//! be available at construction time — on this wallet it sits behind a
//! biometric prompt (see [`crate::keystore`]).
//!
//! An account witness commits to four things: the network's genesis hash
//! (so a signature can never replay on another network), the transaction's
//! canonical signing hash, the account's spending counter (so it can never
//! replay on the same network), and of course the secret key. The signed
//! message is a domain-tagged concatenation of the first three.
//!
//! The signer is stateless and trusts the counter it is given. Incrementing
//! and persisting the counter after a successful broadcast is the caller's
//! job — keeping I/O out of here makes signing safe to retry.

use serde::{Deserialize, Serialize};

use crate::crypto::keys::{AccountKeypair, AccountPublicKey, AccountSignature};
use crate::transaction::builder::UnsignedTransaction;
use crate::transaction::types::SpendingCounter;

/// Domain separation tag for account witnesses. Changing this is a
/// consensus break.
const WITNESS_DOMAIN_TAG: &[u8] = b"OBOL-WITNESS-ACCOUNT-V1";

// ---------------------------------------------------------------------------
// Witness
// ---------------------------------------------------------------------------

/// Cryptographic proof authorizing a transaction input.
///
/// An Ed25519 signature over
/// `tag || genesis_hash || sign_data_hash || counter_le`. Deterministic for
/// fixed inputs; two witnesses over the same transaction with different
/// counters are necessarily different.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    signature: AccountSignature,
}

impl Witness {
    /// Produces the account witness for a signing hash.
    pub fn for_account(
        genesis_hash: &[u8; 32],
        sign_data_hash: &[u8; 32],
        key: &AccountKeypair,
        counter: SpendingCounter,
    ) -> Self {
        let message = Self::witness_message(genesis_hash, sign_data_hash, counter);
        Witness {
            signature: key.sign(&message),
        }
    }

    /// Verifies this witness against the account's public key — the same
    /// check a validating node performs before debiting the account.
    pub fn verify(
        &self,
        genesis_hash: &[u8; 32],
        sign_data_hash: &[u8; 32],
        counter: SpendingCounter,
        public_key: &AccountPublicKey,
    ) -> bool {
        let message = Self::witness_message(genesis_hash, sign_data_hash, counter);
        public_key.verify(&message, &self.signature)
    }

    /// The underlying signature.
    pub fn signature(&self) -> &AccountSignature {
        &self.signature
    }

    fn witness_message(
        genesis_hash: &[u8; 32],
        sign_data_hash: &[u8; 32],
        counter: SpendingCounter,
    ) -> Vec<u8> {
        let mut message =
            Vec::with_capacity(WITNESS_DOMAIN_TAG.len() + 32 + 32 + std::mem::size_of::<u32>());
        message.extend_from_slice(WITNESS_DOMAIN_TAG);
        message.extend_from_slice(genesis_hash);
        message.extend_from_slice(sign_data_hash);
        message.extend_from_slice(&counter.as_u32().to_le_bytes());
        message
    }
}

// ---------------------------------------------------------------------------
// AuthenticatedTransaction
// ---------------------------------------------------------------------------

/// A sealed, witness-carrying transaction ready for submission.
///
/// Immutable once produced: the fields are private, construction consumes
/// the unsigned transaction, and no mutator exists. A given unsigned
/// transaction should be signed at most once per spending counter value —
/// the type can't enforce that across calls, but it never re-signs an
/// instance either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedTransaction {
    transaction: UnsignedTransaction,
    witness: Witness,
}

impl AuthenticatedTransaction {
    /// The underlying transaction body.
    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.transaction
    }

    /// The witness covering input index 0.
    pub fn witness(&self) -> &Witness {
        &self.witness
    }
}

// ---------------------------------------------------------------------------
// sign_transaction
// ---------------------------------------------------------------------------

/// Signs an unsigned transfer, attaching the account witness at input
/// index 0.
///
/// Single-input transactions only — this wallet always builds exactly one
/// account input, so multi-witness ordering never arises.
///
/// The caller must supply a `counter` value not previously used for this
/// account. The signer performs no bookkeeping: it is pure over its
/// arguments, and the increment-and-persist step belongs to the caller
/// after a successful broadcast.
pub fn sign_transaction(
    unsigned: UnsignedTransaction,
    counter: SpendingCounter,
    key: &AccountKeypair,
    genesis_hash: &[u8; 32],
) -> AuthenticatedTransaction {
    let sign_data_hash = unsigned.sign_data_hash();
    let witness = Witness::for_account(genesis_hash, &sign_data_hash, key, counter);
    AuthenticatedTransaction {
        transaction: unsigned,
        witness,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
