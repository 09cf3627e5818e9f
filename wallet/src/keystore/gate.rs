// Copyright (c) 2026 Obol Contributors. MIT License.
// See LICENSE for details.

//! # Key Access Gate
//!
//! The state machine mediating a single request to decrypt a spending key.
//! One gate instance owns one logical request:
//!
//! ```text
//! Idle -> Authenticating -> { Succeeded, Canceled, Failed }
//! ```
//!
//! Retry and fallback re-enter `Authenticating` internally — they are loop
//! iterations, not user-visible states. The classification table in
//! [`super::classifier`] is the single source of transition truth; the gate
//! is deliberately just a loop around it.
//!
//! ## Terminal callbacks
//!
//! The owner supplies a success and a failure callback at construction.
//! Exactly one of them fires, exactly once, no matter how the request ends
//! — sensor success, user cancellation, teardown, or hardware fault. A
//! `resolved` latch enforces this even when `cancel()` is called twice or
//! after a success.
//!
//! ## Concurrency
//!
//! A single logical request is in flight at a time. Gate methods take
//! `&self`; transition state sits behind a `parking_lot::Mutex` that is
//! never held across an await. The only suspension points are the store's
//! `decrypt` and `cancel` calls. Cancellation races (cancel vs. a scan that
//! just resolved) are settled by the store's `cancel -> was_in_flight`
//! signal; the gate trusts it rather than re-deriving the answer.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use super::classifier::{classify, Disposition};
use super::store::{AuthPolicy, DecryptedKey, KeyAccessRequest, KeyStore, RejectionCode};

// ---------------------------------------------------------------------------
// GateState
// ---------------------------------------------------------------------------

/// Observable lifecycle state of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No request issued yet.
    Idle,
    /// A decrypt request is in flight (possibly a retry or fallback
    /// iteration).
    Authenticating,
    /// The key was released and delivered. Terminal.
    Succeeded,
    /// The request was canceled. Terminal.
    Canceled,
    /// The request failed with a non-recoverable rejection. Terminal.
    Failed,
}

type SuccessCallback = Box<dyn FnOnce(DecryptedKey) + Send>;
type FailureCallback = Box<dyn FnOnce(RejectionCode) + Send>;

struct GateInner {
    state: GateState,
    /// Error the embedding UI should currently display, if any. Cleared on
    /// cancellation, fallback swap, and invalid-key failures per the
    /// classification table.
    visible_error: Option<RejectionCode>,
    /// Latch: set on the first terminal resolution, checked by every path
    /// that could resolve the request.
    resolved: bool,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

// ---------------------------------------------------------------------------
// KeyAccessGate
// ---------------------------------------------------------------------------

/// Authentication-gated access to one stored spending key.
///
/// Construct with the key id, a prompt reason, and the terminal callback
/// pair; then drive it with [`start`](Self::start),
/// [`cancel`](Self::cancel), and [`use_fallback`](Self::use_fallback). The
/// gate knows nothing about transactions — composing the released key with
/// the signing pipeline is the caller's business.
pub struct KeyAccessGate {
    store: Arc<dyn KeyStore>,
    key_id: String,
    reason: String,
    inner: Mutex<GateInner>,
}

impl KeyAccessGate {
    /// Creates a gate for `key_id`, idle until [`start`](Self::start).
    ///
    /// `reason` is the human-readable prompt text forwarded to the platform
    /// authentication dialog.
    pub fn new(
        store: Arc<dyn KeyStore>,
        key_id: impl Into<String>,
        reason: impl Into<String>,
        on_success: impl FnOnce(DecryptedKey) + Send + 'static,
        on_failure: impl FnOnce(RejectionCode) + Send + 'static,
    ) -> Self {
        KeyAccessGate {
            store,
            key_id: key_id.into(),
            reason: reason.into(),
            inner: Mutex::new(GateInner {
                state: GateState::Idle,
                visible_error: None,
                resolved: false,
                on_success: Some(Box::new(on_success)),
                on_failure: Some(Box::new(on_failure)),
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GateState {
        self.inner.lock().state
    }

    /// The error the UI should currently display, if any.
    pub fn visible_error(&self) -> Option<RejectionCode> {
        self.inner.lock().visible_error
    }

    /// Issues the initial biometric request and runs the classification
    /// loop to a terminal state.
    ///
    /// Returns once the request resolves; the outcome is delivered through
    /// the terminal callbacks. Calling `start` on an already-running or
    /// already-resolved gate is a no-op.
    pub async fn start(&self) {
        self.authenticate(AuthPolicy::Biometric).await;
    }

    /// Cancels the request.
    ///
    /// If a prompt is in flight, the store aborts it and the pending
    /// decrypt resolves with `CANCELED` through the normal classification
    /// path. If the scan had already finished (nothing in flight), the gate
    /// resolves the request here: clears any visible error and delivers
    /// `CANCELED` through the failure callback. Either way the request
    /// resolves exactly once; extra calls are no-ops.
    pub async fn cancel(&self) {
        let was_in_flight = self.store.cancel(RejectionCode::Canceled).await;
        if !was_in_flight {
            if let Some(callback) = self.take_failure(GateState::Canceled, None) {
                callback(RejectionCode::Canceled);
            }
        }
    }

    /// Switches the request to the PIN fallback at the user's demand.
    ///
    /// Any in-flight biometric prompt is aborted with
    /// `SWAPPED_TO_FALLBACK`, which the running loop classifies into a
    /// silent policy swap. If nothing was in flight, a fresh `SYSTEM_PIN`
    /// request is issued here instead.
    pub async fn use_fallback(&self) {
        let was_in_flight = self
            .store
            .cancel(RejectionCode::SwappedToFallback)
            .await;
        if !was_in_flight {
            self.authenticate(AuthPolicy::SystemPin).await;
        }
    }

    /// Teardown: the owning context is going away, so no request may
    /// outlive it. Equivalent to [`cancel`](Self::cancel) and just as
    /// idempotent — safe to call after any terminal state.
    pub async fn shutdown(&self) {
        self.cancel().await;
    }

    // -- internals ----------------------------------------------------------

    /// The authenticating loop: issue a request, classify the outcome,
    /// transition. Runs until a terminal state is reached.
    async fn authenticate(&self, initial_policy: AuthPolicy) {
        {
            let mut guard = self.inner.lock();
            if guard.resolved || guard.state == GateState::Authenticating {
                return;
            }
            guard.state = GateState::Authenticating;
        }

        let mut policy = initial_policy;
        loop {
            let request = KeyAccessRequest::new(&self.key_id, policy, &self.reason);
            debug!(
                request_id = %request.request_id,
                key_id = %request.key_id,
                policy = %request.policy,
                "issuing key access request"
            );

            match self.store.decrypt(&request).await {
                Ok(key) => {
                    debug!(request_id = %request.request_id, "key released");
                    if let Some(callback) = self.take_success() {
                        callback(key);
                    }
                    return;
                }
                Err(code) => match classify(code) {
                    Disposition::Fallback => {
                        debug!(
                            request_id = %request.request_id,
                            "swapping to PIN fallback"
                        );
                        self.inner.lock().visible_error = None;
                        policy = AuthPolicy::SystemPin;
                    }
                    Disposition::Retry => {
                        // Fail-open: transient or unclassified sensor
                        // fault. Logged so a misclassification is
                        // diagnosable, bounded by the sensor's own limits.
                        warn!(
                            request_id = %request.request_id,
                            code = %code,
                            "unclassified key access rejection, retrying"
                        );
                    }
                    Disposition::Cancel => {
                        if let Some(callback) = self.take_failure(GateState::Canceled, None) {
                            callback(RejectionCode::Canceled);
                        }
                        return;
                    }
                    Disposition::Fail { error, visible } => {
                        if visible {
                            error!(
                                request_id = %request.request_id,
                                code = %code,
                                "key access failed"
                            );
                        }
                        let shown = visible.then_some(error);
                        if let Some(callback) = self.take_failure(GateState::Failed, shown) {
                            callback(error);
                        }
                        return;
                    }
                },
            }
        }
    }

    /// Resolves the request as succeeded, once. Drops the failure callback.
    fn take_success(&self) -> Option<SuccessCallback> {
        let mut guard = self.inner.lock();
        if guard.resolved {
            return None;
        }
        guard.resolved = true;
        guard.state = GateState::Succeeded;
        guard.visible_error = None;
        guard.on_failure = None;
        guard.on_success.take()
    }

    /// Resolves the request as failed/canceled, once. Drops the success
    /// callback.
    fn take_failure(
        &self,
        terminal: GateState,
        visible_error: Option<RejectionCode>,
    ) -> Option<FailureCallback> {
        let mut guard = self.inner.lock();
        if guard.resolved {
            return None;
        }
        guard.resolved = true;
        guard.state = terminal;
        guard.visible_error = visible_error;
        guard.on_success = None;
        guard.on_failure.take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Key store test double driven by a pre-loaded script of outcomes.
    /// Scans resolve immediately, so `cancel` always reports nothing in
    /// flight; the codes passed to `cancel` are recorded for assertions.
    struct ScriptedStore {
        script: Mutex<VecDeque<Result<Vec<u8>, RejectionCode>>>,
        policies_seen: Mutex<Vec<AuthPolicy>>,
        cancels_seen: Mutex<Vec<RejectionCode>>,
    }

    impl ScriptedStore {
        fn new(script: Vec<Result<Vec<u8>, RejectionCode>>) -> Arc<Self> {
            Arc::new(ScriptedStore {
                script: Mutex::new(script.into()),
                policies_seen: Mutex::new(Vec::new()),
                cancels_seen: Mutex::new(Vec::new()),
            })
        }

        fn policies(&self) -> Vec<AuthPolicy> {
            self.policies_seen.lock().clone()
        }
    }

    #[async_trait]
    impl KeyStore for ScriptedStore {
        async fn decrypt(&self, request: &KeyAccessRequest) -> Result<DecryptedKey, RejectionCode> {
            self.policies_seen.lock().push(request.policy);
            let outcome = self
                .script
                .lock()
                .pop_front()
                .expect("scripted store ran out of outcomes");
            outcome.map(DecryptedKey::new)
        }

        async fn cancel(&self, code: RejectionCode) -> bool {
            self.cancels_seen.lock().push(code);
            false
        }
    }

    /// Collects terminal callback invocations for assertions.
    #[derive(Default)]
    struct Outcomes {
        successes: Mutex<Vec<Vec<u8>>>,
        failures: Mutex<Vec<RejectionCode>>,
    }

    fn gate_with(
        store: Arc<ScriptedStore>,
        outcomes: &Arc<Outcomes>,
    ) -> KeyAccessGate {
        let on_success = {
            let outcomes = Arc::clone(outcomes);
            move |key: DecryptedKey| outcomes.successes.lock().push(key.into_bytes())
        };
        let on_failure = {
            let outcomes = Arc::clone(outcomes);
            move |code: RejectionCode| outcomes.failures.lock().push(code)
        };
        KeyAccessGate::new(store, "spending-key", "Authorize operation", on_success, on_failure)
    }

    #[tokio::test]
    async fn success_delivers_key_exactly_once() {
        let store = ScriptedStore::new(vec![Ok(vec![7u8; 32])]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        assert_eq!(gate.state(), GateState::Idle);
        gate.start().await;

        assert_eq!(gate.state(), GateState::Succeeded);
        assert_eq!(*outcomes.successes.lock(), vec![vec![7u8; 32]]);
        assert!(outcomes.failures.lock().is_empty());
        assert_eq!(store.policies(), vec![AuthPolicy::Biometric]);
    }

    #[tokio::test]
    async fn fallback_swap_reissues_with_pin_and_stays_silent() {
        let store = ScriptedStore::new(vec![
            Err(RejectionCode::SwappedToFallback),
            Ok(vec![1u8; 32]),
        ]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;

        // Exactly one subsequent request, under the PIN policy, and no
        // callback fired for the swap itself.
        assert_eq!(
            store.policies(),
            vec![AuthPolicy::Biometric, AuthPolicy::SystemPin]
        );
        assert_eq!(outcomes.successes.lock().len(), 1);
        assert!(outcomes.failures.lock().is_empty());
        assert_eq!(gate.visible_error(), None);
    }

    #[tokio::test]
    async fn sensor_lockout_fails_visibly_without_retry() {
        let store = ScriptedStore::new(vec![Err(RejectionCode::SensorLockout)]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;

        assert_eq!(gate.state(), GateState::Failed);
        assert_eq!(*outcomes.failures.lock(), vec![RejectionCode::SensorLockout]);
        assert_eq!(gate.visible_error(), Some(RejectionCode::SensorLockout));
        assert_eq!(store.policies().len(), 1, "no retry may be issued");
    }

    #[tokio::test]
    async fn invalid_key_fails_cleanly() {
        let store = ScriptedStore::new(vec![Err(RejectionCode::InvalidKey)]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;

        assert_eq!(gate.state(), GateState::Failed);
        assert_eq!(*outcomes.failures.lock(), vec![RejectionCode::InvalidKey]);
        assert_eq!(gate.visible_error(), None, "invalid key shows no error state");
    }

    #[tokio::test]
    async fn canceled_outcome_resolves_as_canceled() {
        let store = ScriptedStore::new(vec![Err(RejectionCode::Canceled)]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;

        assert_eq!(gate.state(), GateState::Canceled);
        assert_eq!(*outcomes.failures.lock(), vec![RejectionCode::Canceled]);
        assert_eq!(gate.visible_error(), None);
    }

    #[tokio::test]
    async fn unclassified_codes_retry_silently_until_success() {
        // Two unrecognized rejections, then success: exactly two silent
        // retries, then Succeeded.
        let store = ScriptedStore::new(vec![
            Err(RejectionCode::Unknown),
            Err(RejectionCode::Unknown),
            Ok(vec![9u8; 32]),
        ]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;

        assert_eq!(gate.state(), GateState::Succeeded);
        assert_eq!(store.policies().len(), 3);
        assert_eq!(
            store.policies(),
            vec![AuthPolicy::Biometric; 3],
            "retries keep the same policy"
        );
        assert_eq!(outcomes.successes.lock().len(), 1);
        assert!(outcomes.failures.lock().is_empty());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let store = ScriptedStore::new(vec![]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.cancel().await;
        gate.cancel().await;

        assert_eq!(gate.state(), GateState::Canceled);
        assert_eq!(*outcomes.failures.lock(), vec![RejectionCode::Canceled]);
    }

    #[tokio::test]
    async fn cancel_after_success_fires_nothing() {
        let store = ScriptedStore::new(vec![Ok(vec![3u8; 32])]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;
        gate.cancel().await;

        assert_eq!(gate.state(), GateState::Succeeded);
        assert_eq!(outcomes.successes.lock().len(), 1);
        assert!(outcomes.failures.lock().is_empty());
    }

    #[tokio::test]
    async fn start_after_resolution_is_a_no_op() {
        let store = ScriptedStore::new(vec![Err(RejectionCode::InvalidKey)]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;
        gate.start().await; // would panic the scripted store if a request were issued

        assert_eq!(store.policies().len(), 1);
        assert_eq!(outcomes.failures.lock().len(), 1);
    }

    #[tokio::test]
    async fn user_fallback_with_idle_sensor_issues_pin_request() {
        let store = ScriptedStore::new(vec![Ok(vec![5u8; 32])]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.use_fallback().await;

        assert_eq!(store.policies(), vec![AuthPolicy::SystemPin]);
        assert_eq!(
            *store.cancels_seen.lock(),
            vec![RejectionCode::SwappedToFallback]
        );
        assert_eq!(outcomes.successes.lock().len(), 1);
    }

    #[tokio::test]
    async fn shutdown_resolves_an_unstarted_gate() {
        let store = ScriptedStore::new(vec![]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.shutdown().await;

        assert_eq!(gate.state(), GateState::Canceled);
        assert_eq!(*outcomes.failures.lock(), vec![RejectionCode::Canceled]);
        assert_eq!(*store.cancels_seen.lock(), vec![RejectionCode::Canceled]);
    }

    #[tokio::test]
    async fn visible_error_cleared_by_fallback_swap() {
        // A lockout would set a visible error; verify the swap path clears
        // whatever was there before continuing.
        let store = ScriptedStore::new(vec![
            Err(RejectionCode::SwappedToFallback),
            Err(RejectionCode::DecryptionFailed),
        ]);
        let outcomes = Arc::new(Outcomes::default());
        let gate = gate_with(Arc::clone(&store), &outcomes);

        gate.start().await;

        // Terminal decryption failure after the silent swap.
        assert_eq!(gate.state(), GateState::Failed);
        assert_eq!(
            *outcomes.failures.lock(),
            vec![RejectionCode::DecryptionFailed]
        );
        assert_eq!(gate.visible_error(), Some(RejectionCode::DecryptionFailed));
    }
}
