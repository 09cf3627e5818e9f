// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Linear Fee Schedule
//!
//! The network prices a transaction as
//! `fee = constant + coefficient * size_bytes + certificate_fee * n_certs`.
//! Plain transfers carry no certificates, so the last term is zero here,
//! but the parameter is part of the published schedule and rides along.
//!
//! The schedule is an explicit value handed to the builder, not a global —
//! tests run against arbitrary schedules without touching process state.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_FEE_CERTIFICATE, DEFAULT_FEE_COEFFICIENT, DEFAULT_FEE_CONSTANT};
use crate::transaction::builder::UnsignedTransaction;
use crate::transaction::types::Value;

/// Network-wide linear fee parameters, loaded once from chain config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParameters {
    /// Flat component charged on every transaction.
    pub constant: Value,
    /// Per-byte component over the serialized transaction size.
    pub coefficient: Value,
    /// Surcharge per attached certificate.
    pub certificate_fee: Value,
}

impl FeeParameters {
    /// Builds a schedule from raw smallest-unit components.
    pub fn new(constant: Value, coefficient: Value, certificate_fee: Value) -> Self {
        FeeParameters {
            constant,
            coefficient,
            certificate_fee,
        }
    }

    /// Computes the fee for a transaction under this schedule.
    ///
    /// Size is the canonical serialized length. The transaction's own `fee`
    /// field is encoded fixed-width, so its value does not feed back into
    /// the size — one dry-run measurement is exact for the final build.
    ///
    /// Returns `None` if any term overflows, which callers treat as an
    /// unrecoverable estimation failure.
    pub fn calculate(&self, tx: &UnsignedTransaction) -> Option<Value> {
        let size = tx.to_bytes().len() as u64;
        self.coefficient
            .checked_mul(size)
            .and_then(|variable| self.constant.checked_add(variable))
    }
}

impl Default for FeeParameters {
    /// The mainnet schedule from [`crate::config`].
    fn default() -> Self {
        FeeParameters {
            constant: Value::new(DEFAULT_FEE_CONSTANT),
            coefficient: Value::new(DEFAULT_FEE_COEFFICIENT),
            certificate_fee: Value::new(DEFAULT_FEE_CERTIFICATE),
        }
    }
}
