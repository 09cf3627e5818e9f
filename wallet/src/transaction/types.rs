// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Ledger Value Types
//!
//! The vocabulary of an Obol transfer: exact monetary values, Bech32
//! addresses, account references, and the replay-protecting spending
//! counter. Kept small and `Copy`-friendly where possible.
//!
//! All money is a [`Value`] — an integer count of the smallest ledger unit.
//! Arithmetic is checked: overflow returns `None` instead of wrapping,
//! because a wrapped balance is a stolen balance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::MAINNET_HRP;
use crate::crypto::keys::AccountPublicKey;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A monetary value in the smallest indivisible ledger unit.
///
/// Exact integer arithmetic only — no floating point anywhere near money.
/// All operations are checked; `None` means the result would not fit in a
/// `u64`, which callers treat as a hard failure, never a wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(u64);

impl Value {
    /// The zero value.
    pub const ZERO: Value = Value(0);

    /// Wraps a raw smallest-unit count.
    pub const fn new(units: u64) -> Self {
        Value(units)
    }

    /// Returns the raw smallest-unit count.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Checked addition. `None` on overflow.
    pub fn checked_add(self, other: Value) -> Option<Value> {
        self.0.checked_add(other.0).map(Value)
    }

    /// Checked multiplication by a scalar. `None` on overflow.
    pub fn checked_mul(self, factor: u64) -> Option<Value> {
        self.0.checked_mul(factor).map(Value)
    }

    /// Returns `true` if the value is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Error parsing a decimal value string.
#[derive(Debug, Error)]
#[error("invalid value: expected a non-negative decimal integer")]
pub struct ValueParseError;

impl FromStr for Value {
    type Err = ValueParseError;

    /// Parses a base-10 smallest-unit string, e.g. `"155381"`.
    ///
    /// No sign, no separators, no decimal point — fractional amounts do not
    /// exist at this layer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Value).map_err(|_| ValueParseError)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SpendingCounter
// ---------------------------------------------------------------------------

/// Per-account monotonically increasing counter preventing witness replay.
///
/// A witness signed with counter `n` is only valid while the account's
/// on-chain counter is exactly `n`. The wallet increments its local copy
/// only after a successful broadcast; the signer itself never touches it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SpendingCounter(u32);

impl SpendingCounter {
    /// Wraps a raw counter value.
    pub const fn from_u32(counter: u32) -> Self {
        SpendingCounter(counter)
    }

    /// Returns the raw counter value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// The counter to use after this one is consumed by a broadcast
    /// transaction. Saturates at `u32::MAX` rather than wrapping back to a
    /// replayable zero.
    pub fn next(self) -> SpendingCounter {
        SpendingCounter(self.0.saturating_add(1))
    }
}

impl fmt::Display for SpendingCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Discriminant byte for the supported address kinds.
///
/// The ledger is account-based: a `Single` address receives funds into the
/// balance of the embedded public key, an `Account` address names the
/// account itself (the form used for input references).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    /// Payment address: funds credit the account owning the key.
    Single,
    /// Account reference address.
    Account,
}

impl AddressKind {
    const SINGLE_TAG: u8 = 0x03;
    const ACCOUNT_TAG: u8 = 0x05;

    fn tag(self) -> u8 {
        match self {
            AddressKind::Single => Self::SINGLE_TAG,
            AddressKind::Account => Self::ACCOUNT_TAG,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            Self::SINGLE_TAG => Some(AddressKind::Single),
            Self::ACCOUNT_TAG => Some(AddressKind::Account),
            _ => None,
        }
    }
}

/// Errors produced while parsing an address string.
///
/// A malformed address is a terminal fault for whatever operation consumed
/// it — nothing in this crate retries address parsing.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The string is not valid Bech32 at all.
    #[error("address is not valid bech32")]
    InvalidEncoding,

    /// The human-readable part names a different network.
    #[error("wrong address prefix: expected {expected}, got {got}")]
    WrongPrefix {
        /// The prefix this wallet operates with.
        expected: String,
        /// The prefix found on the input.
        got: String,
    },

    /// The payload's leading kind byte is not a known address kind.
    #[error("unknown address kind byte: {0:#04x}")]
    UnknownKind(u8),

    /// The embedded key bytes are not a valid Ed25519 point.
    #[error("address payload is not a valid public key")]
    InvalidKey,

    /// The payload has the wrong length for any supported kind.
    #[error("address payload has invalid length {0}")]
    InvalidLength(usize),
}

/// A ledger address: an address kind plus the owning public key, rendered
/// as Bech32 (`obol1...`).
///
/// Parsing validates everything — prefix, kind byte, payload length, and
/// that the key bytes decode to a real curve point — so an `Address` in
/// hand is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    kind: AddressKind,
    key: AccountPublicKey,
}

impl Address {
    /// Derives the single (payment) address for a public key.
    pub fn single_from_public_key(key: &AccountPublicKey) -> Self {
        Address {
            kind: AddressKind::Single,
            key: key.clone(),
        }
    }

    /// Derives the account reference address for a public key.
    pub fn account_from_public_key(key: &AccountPublicKey) -> Self {
        Address {
            kind: AddressKind::Account,
            key: key.clone(),
        }
    }

    /// Parses and validates a Bech32 address string against the mainnet
    /// prefix.
    pub fn from_string(s: &str) -> Result<Self, AddressError> {
        Self::from_string_with_hrp(s, MAINNET_HRP)
    }

    /// Parses and validates a Bech32 address string against an explicit
    /// network prefix. Testnets use a different HRP, same payload layout.
    pub fn from_string_with_hrp(s: &str, expected_hrp: &str) -> Result<Self, AddressError> {
        let (hrp, payload) = bech32::decode(s).map_err(|_| AddressError::InvalidEncoding)?;
        if hrp.as_str() != expected_hrp {
            return Err(AddressError::WrongPrefix {
                expected: expected_hrp.to_string(),
                got: hrp.as_str().to_string(),
            });
        }
        if payload.len() != 33 {
            return Err(AddressError::InvalidLength(payload.len()));
        }
        let kind = AddressKind::from_tag(payload[0]).ok_or(AddressError::UnknownKind(payload[0]))?;
        let key = AccountPublicKey::try_from_slice(&payload[1..])
            .map_err(|_| AddressError::InvalidKey)?;
        Ok(Address { kind, key })
    }

    /// The address kind discriminant.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The public key embedded in the address.
    pub fn public_key(&self) -> &AccountPublicKey {
        &self.key
    }

    /// Canonical byte representation: kind tag followed by the 32 key bytes.
    /// This is what gets serialized into transactions and hashed.
    pub fn to_bytes(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = self.kind.tag();
        out[1..].copy_from_slice(self.key.as_bytes());
        out
    }

    /// Renders the address as Bech32 under the given network prefix.
    pub fn to_bech32(&self, hrp: &str) -> String {
        let hrp = bech32::Hrp::parse(hrp).expect("static hrp constants are valid");
        bech32::encode::<bech32::Bech32>(hrp, &self.to_bytes())
            .expect("33-byte payload is within bech32 limits")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bech32(MAINNET_HRP))
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// The on-ledger identifier of an account, derived deterministically from
/// its public key. This is what a transaction input debits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    key: AccountPublicKey,
}

impl AccountId {
    /// Derives the account identifier for a public key. No network call,
    /// no randomness — the account *is* the key.
    pub fn from_public_key(key: &AccountPublicKey) -> Self {
        AccountId { key: key.clone() }
    }

    /// The underlying public key.
    pub fn public_key(&self) -> &AccountPublicKey {
        &self.key
    }

    /// Raw 32-byte identifier, as serialized into transaction inputs.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.key.as_bytes()
    }
}

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// A transaction input: a debit of `value` from an account.
///
/// Input order within a transaction is significant — it affects the
/// serialization, the signing hash, and which input a witness covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    account: AccountId,
    value: Value,
}

impl Input {
    /// Builds an input debiting `value` from `account`.
    pub fn from_account(account: AccountId, value: Value) -> Self {
        Input { account, value }
    }

    /// The debited account.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// The debited value.
    pub fn value(&self) -> Value {
        self.value
    }
}

/// A transaction output: a credit of `value` to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    address: Address,
    value: Value,
}

impl Output {
    /// Builds an output crediting `value` to `address`.
    pub fn new(address: Address, value: Value) -> Self {
        Output { address, value }
    }

    /// The credited address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The credited value.
    pub fn value(&self) -> Value {
        self.value
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A wallet-owned account: address, public key, and the current spending
/// counter.
///
/// The counter must increment exactly once per successfully broadcast
/// transaction and never be reused — reuse is a protocol-level replay risk.
/// [`Account::confirm_broadcast`] is the single place that advances it, and
/// the owner calls it only after the network has accepted the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    address: Address,
    public_key: AccountPublicKey,
    spending_counter: SpendingCounter,
}

impl Account {
    /// Creates an account record for a public key with a known counter
    /// (0 for a fresh account, or whatever the chain reports).
    pub fn new(public_key: AccountPublicKey, spending_counter: SpendingCounter) -> Self {
        Account {
            address: Address::single_from_public_key(&public_key),
            public_key,
            spending_counter,
        }
    }

    /// The account's payment address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The account's public key.
    pub fn public_key(&self) -> &AccountPublicKey {
        &self.public_key
    }

    /// The counter to sign the *next* transaction with.
    pub fn spending_counter(&self) -> SpendingCounter {
        self.spending_counter
    }

    /// Advances the counter after a successful broadcast. Calling this for
    /// a transaction that never reached the chain desynchronizes the wallet
    /// from the ledger, so don't.
    pub fn confirm_broadcast(&mut self) {
        self.spending_counter = self.spending_counter.next();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
