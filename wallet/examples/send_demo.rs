// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Send Flow Demo
//!
//! Walks the complete send pipeline end to end with freshly generated keys:
//!
//! 1. seal a spending key into an [`EncryptedKeyStore`]
//! 2. authenticate through the [`KeyAccessGate`]
//! 3. build a fee-adjusted transfer with [`build_transfer`]
//! 4. sign it with [`sign_transaction`] and verify the witness
//!
//! Run with: `cargo run --example send_demo`

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;

use obol_wallet::config::GENESIS_HASH_HEX;
use obol_wallet::crypto::hash::digest_from_hex;
use obol_wallet::crypto::keys::AccountKeypair;
use obol_wallet::keystore::{AlwaysAllow, DecryptedKey, EncryptedKeyStore, KeyAccessGate};
use obol_wallet::transaction::types::SpendingCounter;
use obol_wallet::transaction::{build_transfer, sign_transaction, Address, FeeParameters, Value};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "obol_wallet=debug,send_demo=info".into()),
        )
        .init();

    let genesis = digest_from_hex(GENESIS_HASH_HEX).context("genesis hash constant")?;

    // --- Seal a spending key ---
    let device_key = [0x5a; 32];
    let spending_keypair = AccountKeypair::generate();
    let store = Arc::new(EncryptedKeyStore::new(device_key, AlwaysAllow));
    store.seal("spending-key", &spending_keypair.to_bytes())?;
    tracing::info!(key_id = "spending-key", "spending key sealed");

    // --- Authenticate through the gate ---
    let released: Arc<Mutex<Option<DecryptedKey>>> = Arc::new(Mutex::new(None));
    let gate = KeyAccessGate::new(
        Arc::clone(&store) as Arc<dyn obol_wallet::keystore::KeyStore>,
        "spending-key",
        "Authorize sending 1000 to the receiver",
        {
            let released = Arc::clone(&released);
            move |key| *released.lock() = Some(key)
        },
        |code| tracing::error!(%code, "key access failed"),
    );
    gate.start().await;

    let key_bytes = released
        .lock()
        .take()
        .ok_or_else(|| anyhow!("authentication did not release the key"))?;
    let spending_key = AccountKeypair::from_secret_bytes(key_bytes.as_bytes())?;
    tracing::info!(state = ?gate.state(), "key released");

    // --- Build the transfer ---
    let receiver = Address::single_from_public_key(&AccountKeypair::generate().public_key());
    let fee_params = FeeParameters::default();
    let balance = Value::new(10_000_000);
    let amount = Value::new(1000);

    let unsigned = build_transfer(
        &spending_key.public_key(),
        &receiver.to_string(),
        amount,
        balance,
        &fee_params,
    )?;
    tracing::info!(
        fee = %unsigned.fee(),
        total_input = %unsigned.total_input().context("input overflow")?,
        "transfer built"
    );

    // --- Sign and verify ---
    let counter = SpendingCounter::from_u32(0);
    let hash = unsigned.sign_data_hash();
    let sealed = sign_transaction(unsigned, counter, &spending_key, &genesis);
    let valid = sealed
        .witness()
        .verify(&genesis, &hash, counter, &spending_key.public_key());

    println!("Send flow completed.");
    println!("  Receiver      : {}", receiver);
    println!("  Amount        : {}", amount);
    println!("  Fee           : {}", sealed.transaction().fee());
    println!("  Sign hash     : {}", hex::encode(hash));
    println!("  Witness valid : {}", valid);

    Ok(())
}
