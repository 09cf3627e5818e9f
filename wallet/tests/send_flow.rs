// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! End-to-end tests for the send flow.
//!
//! These exercise the full pipeline the way an embedding app drives it:
//! seal a spending key in the encrypted store, authenticate through the
//! key access gate, build a fee-adjusted transfer, sign it with the
//! released key, and verify the witness the way a validating node would.
//!
//! Each test stands alone with its own store and keys. No shared state,
//! no ordering dependencies.

use std::sync::Arc;

use parking_lot::Mutex;

use obol_wallet::config::GENESIS_HASH_HEX;
use obol_wallet::crypto::hash::digest_from_hex;
use obol_wallet::crypto::keys::AccountKeypair;
use obol_wallet::keystore::{
    AlwaysAllow, DecryptedKey, EncryptedKeyStore, GateState, KeyAccessGate, RejectionCode,
};
use obol_wallet::transaction::types::SpendingCounter;
use obol_wallet::transaction::{build_transfer, sign_transaction, Address, FeeParameters, Value};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const DEVICE_KEY: [u8; 32] = [0x42; 32];
const KEY_ID: &str = "spending-key";

fn genesis() -> [u8; 32] {
    digest_from_hex(GENESIS_HASH_HEX).expect("genesis constant decodes")
}

/// Seals a fresh spending keypair into an encrypted store and returns both.
fn seeded_store() -> (Arc<EncryptedKeyStore<AlwaysAllow>>, AccountKeypair) {
    let keypair = AccountKeypair::generate();
    let store = Arc::new(EncryptedKeyStore::new(DEVICE_KEY, AlwaysAllow));
    store
        .seal(KEY_ID, &keypair.to_bytes())
        .expect("sealing cannot fail with a fresh store");
    (store, keypair)
}

fn receiver_address() -> String {
    Address::single_from_public_key(&AccountKeypair::generate().public_key()).to_string()
}

// ---------------------------------------------------------------------------
// 1. Full Send Flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_build_sign_verify() {
    let (store, original_keypair) = seeded_store();
    let released: Arc<Mutex<Option<DecryptedKey>>> = Arc::new(Mutex::new(None));
    let failures: Arc<Mutex<Vec<RejectionCode>>> = Arc::new(Mutex::new(Vec::new()));

    // Step 1: authenticate through the gate.
    let gate = KeyAccessGate::new(
        store,
        KEY_ID,
        "Authorize sending 100",
        {
            let released = Arc::clone(&released);
            move |key| *released.lock() = Some(key)
        },
        {
            let failures = Arc::clone(&failures);
            move |code| failures.lock().push(code)
        },
    );
    gate.start().await;
    assert_eq!(gate.state(), GateState::Succeeded);
    assert!(failures.lock().is_empty());

    // Step 2: reconstruct the keypair from the released material.
    let key_bytes = released.lock().take().expect("success callback fired");
    let spending_key = AccountKeypair::from_secret_bytes(key_bytes.as_bytes())
        .expect("store releases exactly the sealed 32 bytes");
    assert_eq!(spending_key.public_key(), original_keypair.public_key());

    // Step 3: build a fee-adjusted transfer.
    let fee_params = FeeParameters::default();
    let balance = Value::new(10_000_000);
    let amount = Value::new(100);
    let unsigned = build_transfer(
        &spending_key.public_key(),
        &receiver_address(),
        amount,
        balance,
        &fee_params,
    )
    .expect("balance comfortably covers amount plus fee");

    // The fee invariant: a dry-run priced it, the final carries it.
    assert_eq!(fee_params.calculate(&unsigned), Some(unsigned.fee()));
    assert_eq!(
        unsigned
            .total_output()
            .unwrap()
            .checked_add(unsigned.fee())
            .unwrap(),
        unsigned.total_input().unwrap()
    );
    assert!(unsigned.total_input().unwrap() <= balance);

    // Step 4: sign and verify as a node would.
    let counter = SpendingCounter::from_u32(0);
    let hash = unsigned.sign_data_hash();
    let sealed = sign_transaction(unsigned, counter, &spending_key, &genesis());
    assert!(sealed
        .witness()
        .verify(&genesis(), &hash, counter, &spending_key.public_key()));
}

// ---------------------------------------------------------------------------
// 2. Replay Protection Across Sends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn consecutive_sends_use_distinct_counters() {
    let (_store, keypair) = seeded_store();
    let fee_params = FeeParameters::default();
    let receiver = receiver_address();

    let unsigned = build_transfer(
        &keypair.public_key(),
        &receiver,
        Value::new(500),
        Value::new(50_000_000),
        &fee_params,
    )
    .unwrap();

    let first = sign_transaction(
        unsigned.clone(),
        SpendingCounter::from_u32(0),
        &keypair,
        &genesis(),
    );
    let second = sign_transaction(unsigned, SpendingCounter::from_u32(1), &keypair, &genesis());

    // Same body, different counters, necessarily different witnesses.
    // Each witness only verifies under its own counter.
    assert_eq!(first.transaction(), second.transaction());
    assert_ne!(first.witness(), second.witness());

    let hash = first.transaction().sign_data_hash();
    assert!(first.witness().verify(
        &genesis(),
        &hash,
        SpendingCounter::from_u32(0),
        &keypair.public_key()
    ));
    assert!(!first.witness().verify(
        &genesis(),
        &hash,
        SpendingCounter::from_u32(1),
        &keypair.public_key()
    ));
}

// ---------------------------------------------------------------------------
// 3. Failure Paths Compose
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_key_surfaces_invalid_key_through_the_gate() {
    // Store with nothing sealed: the platform reports INVALID_KEY and the
    // gate must deliver it terminally, without retrying.
    let store = Arc::new(EncryptedKeyStore::new(DEVICE_KEY, AlwaysAllow));
    let failures: Arc<Mutex<Vec<RejectionCode>>> = Arc::new(Mutex::new(Vec::new()));

    let gate = KeyAccessGate::new(
        store,
        "no-such-key",
        "Authorize operation",
        |_key| panic!("success callback must not fire"),
        {
            let failures = Arc::clone(&failures);
            move |code| failures.lock().push(code)
        },
    );
    gate.start().await;

    assert_eq!(gate.state(), GateState::Failed);
    assert_eq!(*failures.lock(), vec![RejectionCode::InvalidKey]);
}

#[tokio::test]
async fn insufficient_funds_never_reaches_the_signer() {
    let keypair = AccountKeypair::generate();
    // Flat 10-unit fee for a predictable boundary.
    let fee_params = FeeParameters::new(Value::new(10), Value::ZERO, Value::ZERO);

    // amount=145, balance=150: first-pass check passes, 145+10 > 150 fails.
    let result = build_transfer(
        &keypair.public_key(),
        &receiver_address(),
        Value::new(145),
        Value::new(150),
        &fee_params,
    );
    assert!(result.is_err(), "the fee must tip this over the balance");
}

#[tokio::test]
async fn teardown_cancels_a_never_started_request() {
    let (store, _keypair) = seeded_store();
    let failures: Arc<Mutex<Vec<RejectionCode>>> = Arc::new(Mutex::new(Vec::new()));

    let gate = KeyAccessGate::new(
        store,
        KEY_ID,
        "Authorize operation",
        |_key| panic!("success callback must not fire"),
        {
            let failures = Arc::clone(&failures);
            move |code| failures.lock().push(code)
        },
    );

    // The owning context goes away before the user ever authenticated.
    gate.shutdown().await;
    gate.shutdown().await;

    assert_eq!(gate.state(), GateState::Canceled);
    assert_eq!(*failures.lock(), vec![RejectionCode::Canceled]);
}
