// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Transaction Construction & Signing
//!
//! The pipeline from "send 100 to this address" to a submittable
//! transaction:
//!
//! ```text
//! types.rs    — Value, Address, AccountId, Input/Output, SpendingCounter
//! fee.rs      — the linear fee schedule (constant + coefficient * size)
//! builder.rs  — two-pass fee-adjusted construction
//! signer.rs   — witness derivation and the sealed AuthenticatedTransaction
//! ```
//!
//! Builder and signer are pure and synchronous; the only shared resource in
//! the whole flow is the account's spending counter, and its
//! increment-and-persist step is owned by the caller after broadcast.
//!
//! ```rust,no_run
//! use obol_wallet::config::GENESIS_HASH_HEX;
//! use obol_wallet::crypto::hash::digest_from_hex;
//! use obol_wallet::crypto::keys::AccountKeypair;
//! use obol_wallet::transaction::{build_transfer, sign_transaction, FeeParameters, Value};
//! use obol_wallet::transaction::types::SpendingCounter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = AccountKeypair::generate();
//! let unsigned = build_transfer(
//!     &key.public_key(),
//!     "obol1...",
//!     Value::new(100),
//!     Value::new(150),
//!     &FeeParameters::default(),
//! )?;
//! let genesis = digest_from_hex(GENESIS_HASH_HEX).unwrap();
//! let sealed = sign_transaction(unsigned, SpendingCounter::from_u32(0), &key, &genesis);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod fee;
pub mod signer;
pub mod types;

pub use builder::{build_transfer, BuildError, UnsignedTransaction};
pub use fee::FeeParameters;
pub use signer::{sign_transaction, AuthenticatedTransaction, Witness};
pub use types::{Account, AccountId, Address, AddressError, Input, Output, SpendingCounter, Value};
