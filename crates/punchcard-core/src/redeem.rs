// ── Redemption client ──
//
// Executes a redemption transaction against the loyalty service with
// bounded retry and a stable idempotency key per logical request. All
// failure is communicated through the outcome value -- nothing here
// raises to the caller.

use std::time::Duration;

use rand::Rng;
use secrecy::SecretString;
use tracing::{debug, warn};

use punchcard_api::types::{CustomerProfileResponse, RedemptionResponse, RedemptionSubmission};
use punchcard_api::ApiClient;

use crate::model::{OutcomeStatus, RedemptionKind, RedemptionOutcome, RedemptionRequest, Reward};

// ── Retry policy ─────────────────────────────────────────────────────

/// Exponential backoff with jitter for transient submission failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_backoff: Duration,
    /// Multiplier applied per subsequent attempt.
    pub factor: u32,
    /// Jitter fraction: each delay is scaled by a uniform draw from
    /// `1.0 ± jitter`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            factor: 2,
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// The jittered delay to sleep after a failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let spread = rand::rng().random_range(1.0 - self.jitter..=1.0 + self.jitter);
        self.nominal_delay(attempt).mul_f64(spread.max(0.0))
    }

    /// Inclusive bounds the jittered delay for `attempt` falls within.
    pub fn delay_bounds(&self, attempt: u32) -> (Duration, Duration) {
        let nominal = self.nominal_delay(attempt);
        (
            nominal.mul_f64((1.0 - self.jitter).max(0.0)),
            nominal.mul_f64(1.0 + self.jitter),
        )
    }

    fn nominal_delay(&self, attempt: u32) -> Duration {
        // Exponent capped so a misconfigured policy cannot overflow.
        let exp = attempt.saturating_sub(1).min(16);
        self.base_backoff.saturating_mul(self.factor.saturating_pow(exp))
    }
}

// ── Transport seam ───────────────────────────────────────────────────

/// The slice of the loyalty service the workflow needs.
///
/// Implemented by [`ApiClient`]; tests substitute scripted transports
/// to exercise the retry and outcome mapping deterministically.
pub trait LoyaltyTransport {
    /// One submission attempt. No retry at this level.
    fn submit(
        &self,
        actor: &SecretString,
        idempotency_key: &str,
        submission: &RedemptionSubmission,
    ) -> impl Future<Output = Result<RedemptionResponse, punchcard_api::Error>> + Send;

    /// Fetch the acting customer's loyalty standing.
    fn fetch_profile(
        &self,
        actor: &SecretString,
    ) -> impl Future<Output = Result<CustomerProfileResponse, punchcard_api::Error>> + Send;
}

impl LoyaltyTransport for ApiClient {
    async fn submit(
        &self,
        actor: &SecretString,
        idempotency_key: &str,
        submission: &RedemptionSubmission,
    ) -> Result<RedemptionResponse, punchcard_api::Error> {
        self.submit_redemption(actor, idempotency_key, submission).await
    }

    async fn fetch_profile(
        &self,
        actor: &SecretString,
    ) -> Result<CustomerProfileResponse, punchcard_api::Error> {
        self.self_info(actor).await
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Submits redemption transactions with retry and idempotency.
pub struct RedemptionClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: LoyaltyTransport> RedemptionClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// The underlying transport, for adjacent reads (profile refresh).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the transaction to a terminal outcome.
    ///
    /// Transient failures are retried up to the policy's attempt budget
    /// with the identical idempotency key, so the service can collapse
    /// replays into one effect. Business rejections and auth/contract
    /// violations return after a single attempt.
    pub async fn submit(&self, request: &RedemptionRequest) -> RedemptionOutcome {
        let submission = RedemptionSubmission {
            kind: request.kind.to_wire(),
            subject_token: request.subject_token.clone(),
        };
        let key = request.idempotency_key.as_str();

        let mut attempt = 1u32;
        loop {
            debug!(kind = %request.kind, attempt, idempotency_key = key, "submitting redemption");

            let result = self
                .transport
                .submit(&request.actor_token, key, &submission)
                .await;

            match result {
                Ok(RedemptionResponse::Granted { eligible_rewards }) => {
                    // Eligible rewards only accompany a reward redemption;
                    // a stamp grant ignores whatever the service sent.
                    let rewards_eligible = match request.kind {
                        RedemptionKind::RewardRedemption => {
                            eligible_rewards.into_iter().map(Reward::from).collect()
                        }
                        RedemptionKind::StampGrant => Vec::new(),
                    };
                    return RedemptionOutcome::granted(rewards_eligible);
                }
                Ok(RedemptionResponse::AlreadyRedeemed) => {
                    return RedemptionOutcome::of(OutcomeStatus::AlreadyRedeemed);
                }
                Ok(RedemptionResponse::Ineligible) => {
                    return RedemptionOutcome::of(OutcomeStatus::Ineligible);
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for_attempt(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "transient submission failure -- backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    warn!(error = %e, attempt, "retries exhausted");
                    return RedemptionOutcome::of(OutcomeStatus::TransientFailure);
                }
                Err(e) => {
                    warn!(error = %e, "submission rejected fatally");
                    return RedemptionOutcome::of(OutcomeStatus::FatalFailure);
                }
            }
        }
    }
}
