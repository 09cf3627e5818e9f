// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Obol Wallet — Core Library
//!
//! The wallet core for the Obol account ledger: everything a wallet needs to
//! move money, and nothing it doesn't. No screens, no network stack, no
//! balance bookkeeping — just the parts with actual algorithmic content.
//!
//! ## What lives here
//!
//! - **crypto** — Ed25519 keys, BLAKE3 hashing, AES-256-GCM sealing.
//!   Low-level primitives; don't roll your own.
//! - **transaction** — Fee-aware transfer construction and witness signing.
//!   Account-based model: one input debits the sender, one output pays the
//!   receiver, surplus is forgotten. The fee depends on the serialized size,
//!   so construction is a two-pass affair (dry-run to measure, real pass to
//!   commit).
//! - **keystore** — The authentication-gated path to the spending key.
//!   A biometric prompt can fail in a dozen creative ways; the
//!   [`keystore::KeyAccessGate`] state machine classifies every one of them
//!   into retry, fallback-to-PIN, cancel, or terminal failure, and delivers
//!   exactly one terminal callback per request.
//! - **config** — Network constants and the default fee schedule.
//!
//! ## What deliberately does not live here
//!
//! Submission of signed transactions, persistence of keys or counters, and
//! anything presentational. The embedding application owns those. In
//! particular the spending counter is incremented and persisted by the caller
//! only after a successful broadcast — the signer is stateless and trusts the
//! counter it is given.
//!
//! ## Design Philosophy
//!
//! 1. Money arithmetic is exact. Checked `u64`, no floats, overflow is an
//!    error, never a wrap.
//! 2. Every failure the sensor hardware can produce has a defined transition.
//!    Unclassified faults are logged and retried, never silently dropped.
//! 3. If it touches key material, its `Debug` impl redacts it.

pub mod config;
pub mod crypto;
pub mod keystore;
pub mod transaction;
