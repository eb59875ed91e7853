// ── Redemption workflow state machine ──
//
// Sequences permission -> scan -> transaction -> result, owning every
// transition. One instance per active scan screen. The presentation
// layer observes states through a watch channel and feeds back exactly
// two commands: "scan again" and "retry permission".

use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;
use secrecy::SecretString;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::WorkflowConfig;
use crate::error::CoreError;
use crate::model::{
    OutcomeStatus, RedemptionKind, RedemptionOutcome, RedemptionRequest, ScanEvent,
};
use crate::permission::{CaptureAuthorizer, PermissionGate, PermissionStatus};
use crate::redeem::{LoyaltyTransport, RedemptionClient};
use crate::scan::ScanDebouncer;
use crate::session::SessionContext;
use crate::store::ProfileStore;

// ── WorkflowState ────────────────────────────────────────────────────

/// UI-visible state of the redemption workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    /// Screen not yet activated.
    Idle,
    /// Waiting on the camera-capability query.
    AwaitingPermission,
    /// Capability denied. Terminal until the operator acts (OS settings)
    /// and issues a permission retry.
    PermissionRefused,
    /// Live camera feed; accepting decodes.
    Scanning,
    /// One submission in flight. New scans are dropped, not queued.
    Submitting,
    /// Transaction reached a terminal outcome; waiting for "scan again".
    Resolved(RedemptionOutcome),
    /// Auth or service contract violation. Terminal until the operator
    /// re-authenticates.
    FatalFailure,
}

impl WorkflowState {
    /// States that require external intervention to leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PermissionRefused | Self::FatalFailure)
    }
}

// ── Workflow ─────────────────────────────────────────────────────────

/// The scan-to-redemption state machine.
///
/// Generic over its three seams -- capability authorizer, session
/// context, and service transport -- so the workflow is deterministic
/// under test with synthetic implementations of each.
pub struct Workflow<A, S, T> {
    gate: PermissionGate<A>,
    session: S,
    client: RedemptionClient<T>,
    debouncer: ScanDebouncer,
    kind: RedemptionKind,
    /// At-most-one in-flight submission, checked before the client is
    /// invoked. The debouncer alone cannot guarantee this: a different
    /// payload inside the window would pass it.
    in_flight: bool,
    state_tx: watch::Sender<WorkflowState>,
    profile_store: Arc<ProfileStore>,
}

impl<A, S, T> Workflow<A, S, T>
where
    A: CaptureAuthorizer,
    S: SessionContext,
    T: LoyaltyTransport,
{
    pub fn new(
        authorizer: A,
        session: S,
        transport: T,
        kind: RedemptionKind,
        config: &WorkflowConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);
        Self {
            gate: PermissionGate::new(authorizer),
            session,
            client: RedemptionClient::new(transport, config.retry.clone()),
            debouncer: ScanDebouncer::new(config.debounce_window),
            kind,
            in_flight: false,
            state_tx,
            profile_store: Arc::new(ProfileStore::new()),
        }
    }

    // ── State observation ────────────────────────────────────────

    /// The current state.
    pub fn state(&self) -> WorkflowState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    /// State changes as a `Stream` for combinator-style consumers.
    pub fn states(&self) -> WatchStream<WorkflowState> {
        WatchStream::new(self.state_tx.subscribe())
    }

    /// The reactive profile store, refreshed after stamp grants.
    pub fn profile_store(&self) -> Arc<ProfileStore> {
        Arc::clone(&self.profile_store)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Screen activation: acquire the capture permission and start
    /// scanning. Only meaningful from `Idle`.
    pub async fn activate(&mut self) -> WorkflowState {
        if self.state() != WorkflowState::Idle {
            trace!(state = ?self.state(), "activate ignored");
            return self.state();
        }
        self.run_permission_check().await
    }

    /// Operator command: re-run a refused permission query.
    pub async fn retry_permission(&mut self) -> WorkflowState {
        if self.state() != WorkflowState::PermissionRefused {
            trace!(state = ?self.state(), "permission retry ignored");
            return self.state();
        }
        self.gate.reset();
        self.run_permission_check().await
    }

    async fn run_permission_check(&mut self) -> WorkflowState {
        self.set_state(WorkflowState::AwaitingPermission);

        let state = match self.gate.check_or_request().await {
            PermissionStatus::Granted => WorkflowState::Scanning,
            PermissionStatus::Denied | PermissionStatus::Unknown => {
                info!("capture permission refused");
                WorkflowState::PermissionRefused
            }
        };
        self.set_state(state.clone());
        state
    }

    /// Operator command: observe the result, then scan the next code.
    pub fn scan_again(&mut self) {
        if matches!(self.state(), WorkflowState::Resolved(_)) {
            self.set_state(WorkflowState::Scanning);
        } else {
            trace!(state = ?self.state(), "scan_again ignored");
        }
    }

    // ── Scan handling ────────────────────────────────────────────

    /// Feed one decode through the workflow.
    ///
    /// Returns the terminal outcome when the event led to a submission,
    /// `None` when it was dropped (wrong state, busy, debounced, or
    /// wrong symbol type). Dropped events are silent by design -- a live
    /// camera feed re-decodes the same code many times per second.
    pub async fn on_scan(&mut self, event: ScanEvent) -> Option<RedemptionOutcome> {
        if self.in_flight || self.state() != WorkflowState::Scanning {
            trace!(state = ?self.state(), "scan dropped");
            return None;
        }

        if !self.debouncer.accept(&event) {
            return None;
        }

        let Some(actor_token) = self.session.current_credential() else {
            // No point contacting the service without a credential.
            warn!("no operator credential -- workflow requires re-authentication");
            self.set_state(WorkflowState::FatalFailure);
            return None;
        };

        let request = RedemptionRequest::from_scan(self.kind, &event, actor_token);

        debug!(kind = %self.kind, idempotency_key = %request.idempotency_key, "scan accepted");
        self.set_state(WorkflowState::Submitting);
        self.in_flight = true;
        let outcome = self.client.submit(&request).await;
        self.in_flight = false;

        if outcome.status == OutcomeStatus::Granted {
            info!(kind = %self.kind, "redemption granted");
            if self.kind == RedemptionKind::StampGrant {
                self.refresh_profile(&request.actor_token).await;
            }
        }

        let state = if outcome.status == OutcomeStatus::FatalFailure {
            WorkflowState::FatalFailure
        } else {
            WorkflowState::Resolved(outcome.clone())
        };
        self.set_state(state);

        Some(outcome)
    }

    /// Consume the capture stream until it ends or `cancel` fires.
    ///
    /// The workflow is the stream's single subscriber; decodes arriving
    /// while a submission is in flight queue in the channel and are
    /// dropped on arrival by the state check in [`on_scan`](Self::on_scan).
    pub async fn drive<St>(&mut self, events: St, cancel: CancellationToken)
    where
        St: Stream<Item = ScanEvent> + Unpin + Send,
    {
        let mut events = events;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = events.next() => {
                    let Some(event) = event else { break };
                    let _ = self.on_scan(event).await;
                }
            }
        }
        debug!("capture stream closed");
    }

    // ── Internals ────────────────────────────────────────────────

    /// Pull the customer's standing after a stamp grant. Best-effort:
    /// a failed refresh keeps the previous snapshot.
    async fn refresh_profile(&self, actor: &SecretString) {
        match self.client.transport().fetch_profile(actor).await {
            Ok(profile) => {
                self.profile_store.apply(profile.into());
                debug!("profile refreshed");
            }
            Err(e) => {
                let e = CoreError::from(e);
                warn!(error = %e, "profile refresh failed (non-fatal)");
            }
        }
    }

    fn set_state(&self, state: WorkflowState) {
        // `send` is a no-op when no receiver is currently subscribed, which
        // would leave `state()` frozen at `Idle`. `send_replace` always
        // updates the stored value -- the same idiom `ProfileStore` uses for
        // its own retained-sender/on-demand-receiver watch channel.
        let _ = self.state_tx.send_replace(state);
    }
}
