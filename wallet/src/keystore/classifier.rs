// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Failure Classification
//!
//! The single source of truth for how a decrypt rejection moves the
//! [`super::KeyAccessGate`] state machine. The gate itself contains no
//! per-code branching — it asks [`classify`] and acts on the
//! [`Disposition`]. Adding a new sensor failure mode means adding one match
//! arm here, nowhere else.

use super::store::RejectionCode;

/// What the gate should do with a rejected decrypt attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Re-issue the request with the same policy. Used for transient and
    /// unclassified sensor faults; retry pressure is bounded by the
    /// sensor's own lockout limits, not by the gate.
    Retry,

    /// Re-issue the request with the PIN policy, silently. Neither
    /// callback fires.
    Fallback,

    /// Resolve the request as canceled: clear any visible error, deliver
    /// `CANCELED` through the failure callback.
    Cancel,

    /// Resolve the request as failed with `error`.
    Fail {
        /// The code delivered through the failure callback.
        error: RejectionCode,
        /// Whether the gate should also surface a user-visible error state
        /// (and log at error level). Hardware-ish faults are shown;
        /// deliberate user actions are not.
        visible: bool,
    },
}

/// Maps a rejection code to its state machine transition.
///
/// Pure function; the full table:
///
/// | code                | disposition        |
/// |---------------------|--------------------|
/// | `SwappedToFallback` | Fallback           |
/// | `Canceled`          | Cancel             |
/// | `InvalidKey`        | Fail, not visible  |
/// | `DecryptionFailed`  | Fail, visible      |
/// | `SensorLockout`     | Fail, visible      |
/// | `Unknown`           | Retry (fail-open)  |
///
/// `Unknown` retrying is deliberate: an unclassified transient fault should
/// not kill the flow, and a genuinely stuck sensor will escalate itself to
/// `SensorLockout` within a few attempts.
pub fn classify(code: RejectionCode) -> Disposition {
    match code {
        RejectionCode::SwappedToFallback => Disposition::Fallback,
        RejectionCode::Canceled => Disposition::Cancel,
        RejectionCode::InvalidKey => Disposition::Fail {
            error: RejectionCode::InvalidKey,
            visible: false,
        },
        RejectionCode::DecryptionFailed => Disposition::Fail {
            error: RejectionCode::DecryptionFailed,
            visible: true,
        },
        RejectionCode::SensorLockout => Disposition::Fail {
            error: RejectionCode::SensorLockout,
            visible: true,
        },
        RejectionCode::Unknown => Disposition::Retry,
    }
}
