// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Transfer Construction
//!
//! Building a fee-correct transfer is a two-pass affair: the fee depends on
//! the serialized transaction size, so we first build a structurally
//! identical dry-run transaction with placeholder values, price it, and only
//! then construct the real thing with `input = amount + fee`.
//!
//! The dry run is sound because every value field is encoded fixed-width —
//! the placeholder amounts occupy exactly as many bytes as the real ones,
//! so the measured size is the final size.
//!
//! The builder does not sign — that happens in [`super::signer`]. The
//! separation keeps construction testable without key material, and without
//! an authentication prompt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::hash::blake3_hash;
use crate::crypto::keys::AccountPublicKey;
use crate::transaction::fee::FeeParameters;
use crate::transaction::types::{AccountId, Address, AddressError, Input, Output, Value};

// Placeholder amounts for the dry-run pass. The values are irrelevant to a
// size-based fee; they only need to occupy the field.
const DRY_RUN_INPUT: Value = Value::new(1_000_000);
const DRY_RUN_OUTPUT: Value = Value::new(1);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while constructing a transfer.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The account balance cannot cover the requested amount plus fee.
    ///
    /// Also raised when fee estimation itself fails (overflow): the network
    /// would reject the transaction either way, and the caller's remedy is
    /// identical — try a smaller amount.
    #[error("insufficient funds: balance cannot cover amount plus fee")]
    InsufficientFunds,

    /// The receiver address string did not parse. Terminal — retrying with
    /// the same string cannot succeed.
    #[error("malformed receiver address: {0}")]
    MalformedAddress(#[from] AddressError),
}

// ---------------------------------------------------------------------------
// UnsignedTransaction
// ---------------------------------------------------------------------------

/// A sealed but unsigned transfer: ordered inputs, ordered outputs, and the
/// fee the network will charge for it.
///
/// Input and output order is significant — it is part of the canonical
/// serialization and therefore of the signing hash. The sequences are
/// exactly as constructed and never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    fee: Value,
}

impl UnsignedTransaction {
    /// Assembles a transaction from its parts. Prefer [`build_transfer`]
    /// unless you are constructing test fixtures.
    pub fn new(inputs: Vec<Input>, outputs: Vec<Output>, fee: Value) -> Self {
        UnsignedTransaction {
            inputs,
            outputs,
            fee,
        }
    }

    /// The ordered inputs.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// The ordered outputs.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// The fee this transaction pays.
    pub fn fee(&self) -> Value {
        self.fee
    }

    /// Sum of all input values. `None` on overflow.
    pub fn total_input(&self) -> Option<Value> {
        self.inputs
            .iter()
            .try_fold(Value::ZERO, |acc, i| acc.checked_add(i.value()))
    }

    /// Sum of all output values. `None` on overflow.
    pub fn total_output(&self) -> Option<Value> {
        self.outputs
            .iter()
            .try_fold(Value::ZERO, |acc, o| acc.checked_add(o.value()))
    }

    /// Canonical byte representation used for sizing and for the signing
    /// hash.
    ///
    /// Deterministic concatenation with fixed-width little-endian values:
    /// input count, then per input the 32-byte account id and value; output
    /// count, then per output the 33-byte address and value; finally the
    /// fee. serde/JSON is deliberately avoided — field ordering must be
    /// byte-stable forever, not "whatever the serializer did this release".
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + self.inputs.len() * 40 + self.outputs.len() * 41);

        buf.push(self.inputs.len() as u8);
        for input in &self.inputs {
            buf.extend_from_slice(input.account().as_bytes());
            buf.extend_from_slice(&input.value().as_u64().to_le_bytes());
        }

        buf.push(self.outputs.len() as u8);
        for output in &self.outputs {
            buf.extend_from_slice(&output.address().to_bytes());
            buf.extend_from_slice(&output.value().as_u64().to_le_bytes());
        }

        buf.extend_from_slice(&self.fee.as_u64().to_le_bytes());
        buf
    }

    /// The canonical signing hash: BLAKE3 over [`to_bytes`](Self::to_bytes).
    ///
    /// This is the sole job of the finalizer step — every witness is a
    /// signature that commits to this digest.
    pub fn sign_data_hash(&self) -> [u8; 32] {
        blake3_hash(&self.to_bytes())
    }
}

// ---------------------------------------------------------------------------
// build_transfer
// ---------------------------------------------------------------------------

/// Builds a fee-adjusted transfer of `amount` from the sender's account to
/// `receiver`, or fails with [`BuildError::InsufficientFunds`].
///
/// The produced transaction debits `amount + fee` from the sender and pays
/// `amount` to the receiver. Any surplus is forgotten rather than returned
/// through a change output — on an account ledger there is no change
/// address, the un-debited remainder simply stays in the account.
///
/// Pure function over its arguments: no I/O, no shared state, safe to call
/// again with different parameters after a failure.
///
/// # Errors
///
/// - [`BuildError::InsufficientFunds`] if `amount` alone exceeds the balance
///   (fast path, checked before any construction), if fee estimation fails,
///   or if `amount + fee` exceeds the balance (the real check).
/// - [`BuildError::MalformedAddress`] if `receiver` does not parse; terminal.
pub fn build_transfer(
    sender: &AccountPublicKey,
    receiver: &str,
    amount: Value,
    account_balance: Value,
    fee_params: &FeeParameters,
) -> Result<UnsignedTransaction, BuildError> {
    // Fast path: no point pricing a transfer the balance can't even cover
    // before fees.
    if amount > account_balance {
        return Err(BuildError::InsufficientFunds);
    }

    let receiver_address = Address::from_string(receiver)?;
    let source = AccountId::from_public_key(sender);

    // Dry-run pass: same shape, placeholder values, just to measure.
    let draft = UnsignedTransaction::new(
        vec![Input::from_account(source.clone(), DRY_RUN_INPUT)],
        vec![Output::new(receiver_address.clone(), DRY_RUN_OUTPUT)],
        Value::ZERO,
    );
    let fee = fee_params
        .calculate(&draft)
        .ok_or(BuildError::InsufficientFunds)?;

    // The real balance check: amount plus the fee we now know.
    let total = amount
        .checked_add(fee)
        .ok_or(BuildError::InsufficientFunds)?;
    if total > account_balance {
        return Err(BuildError::InsufficientFunds);
    }

    Ok(UnsignedTransaction::new(
        vec![Input::from_account(source, total)],
        vec![Output::new(receiver_address, amount)],
        fee,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::AccountKeypair;

    fn receiver_string() -> String {
        let kp = AccountKeypair::generate();
        Address::single_from_public_key(&kp.public_key()).to_string()
    }

    /// A schedule with coefficient 0 so tests can predict the exact fee.
    fn flat_fee(fee: u64) -> FeeParameters {
        FeeParameters::new(Value::new(fee), Value::ZERO, Value::ZERO)
    }

    #[test]
    fn build_succeeds_and_balances() {
        // amount=100, balance=150, fee=10 -> input=110, output=100, fee=10.
        let sender = AccountKeypair::generate();
        let tx = build_transfer(
            &sender.public_key(),
            &receiver_string(),
            Value::new(100),
            Value::new(150),
            &flat_fee(10),
        )
        .unwrap();

        assert_eq!(tx.inputs().len(), 1);
        assert_eq!(tx.outputs().len(), 1);
        assert_eq!(tx.inputs()[0].value(), Value::new(110));
        assert_eq!(tx.outputs()[0].value(), Value::new(100));
        assert_eq!(tx.fee(), Value::new(10));

        // output + fee == input, and input never exceeds the balance.
        assert_eq!(
            tx.total_output().unwrap().checked_add(tx.fee()).unwrap(),
            tx.total_input().unwrap()
        );
        assert!(tx.total_input().unwrap() <= Value::new(150));
    }

    #[test]
    fn amount_over_balance_fails_before_fee_estimation() {
        let sender = AccountKeypair::generate();
        // The receiver string is garbage: if the fast path fired first as
        // required, we must see InsufficientFunds, not MalformedAddress.
        let result = build_transfer(
            &sender.public_key(),
            "not-an-address",
            Value::new(200),
            Value::new(150),
            &flat_fee(10),
        );
        assert!(matches!(result, Err(BuildError::InsufficientFunds)));
    }

    #[test]
    fn second_pass_check_fires_when_fee_tips_over() {
        // amount=145, balance=150, fee=10 -> 155 > 150, so the first-pass
        // check passes but the real check must fail.
        let sender = AccountKeypair::generate();
        let result = build_transfer(
            &sender.public_key(),
            &receiver_string(),
            Value::new(145),
            Value::new(150),
            &flat_fee(10),
        );
        assert!(matches!(result, Err(BuildError::InsufficientFunds)));
    }

    #[test]
    fn exact_cover_is_accepted() {
        // amount + fee == balance is still affordable.
        let sender = AccountKeypair::generate();
        let tx = build_transfer(
            &sender.public_key(),
            &receiver_string(),
            Value::new(140),
            Value::new(150),
            &flat_fee(10),
        )
        .unwrap();
        assert_eq!(tx.total_input().unwrap(), Value::new(150));
    }

    #[test]
    fn fee_estimation_overflow_maps_to_insufficient_funds() {
        let sender = AccountKeypair::generate();
        let params = FeeParameters::new(Value::new(u64::MAX), Value::new(1), Value::ZERO);
        let result = build_transfer(
            &sender.public_key(),
            &receiver_string(),
            Value::new(1),
            Value::new(u64::MAX),
            &params,
        );
        assert!(matches!(result, Err(BuildError::InsufficientFunds)));
    }

    #[test]
    fn malformed_receiver_is_terminal() {
        let sender = AccountKeypair::generate();
        let result = build_transfer(
            &sender.public_key(),
            "obol1qqqqnotvalid",
            Value::new(1),
            Value::new(100),
            &flat_fee(1),
        );
        assert!(matches!(result, Err(BuildError::MalformedAddress(_))));
    }

    #[test]
    fn dry_run_fee_matches_final_fee() {
        // The invariant: a dry-run build over the same shape computes the
        // exact fee the final transaction carries.
        let sender = AccountKeypair::generate();
        let receiver = receiver_string();
        let params = FeeParameters::default();

        let tx = build_transfer(
            &sender.public_key(),
            &receiver,
            Value::new(1_000),
            Value::new(10_000_000),
            &params,
        )
        .unwrap();

        assert_eq!(params.calculate(&tx), Some(tx.fee()));
    }

    #[test]
    fn input_reference_is_the_sender_account() {
        let sender = AccountKeypair::generate();
        let tx = build_transfer(
            &sender.public_key(),
            &receiver_string(),
            Value::new(5),
            Value::new(1_000_000),
            &flat_fee(1),
        )
        .unwrap();
        assert_eq!(
            tx.inputs()[0].account(),
            &AccountId::from_public_key(&sender.public_key())
        );
    }

    #[test]
    fn sign_data_hash_is_order_sensitive() {
        let sender = AccountKeypair::generate();
        let source = AccountId::from_public_key(&sender.public_key());
        let a = Address::single_from_public_key(&AccountKeypair::generate().public_key());
        let b = Address::single_from_public_key(&AccountKeypair::generate().public_key());

        let tx_ab = UnsignedTransaction::new(
            vec![Input::from_account(source.clone(), Value::new(10))],
            vec![
                Output::new(a.clone(), Value::new(4)),
                Output::new(b.clone(), Value::new(5)),
            ],
            Value::new(1),
        );
        let tx_ba = UnsignedTransaction::new(
            vec![Input::from_account(source, Value::new(10))],
            vec![Output::new(b, Value::new(5)), Output::new(a, Value::new(4))],
            Value::new(1),
        );

        assert_ne!(tx_ab.sign_data_hash(), tx_ba.sign_data_hash());
    }
}
