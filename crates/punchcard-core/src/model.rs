// ── Domain types ──
//
// Workflow-facing types for scan events, redemption transactions, and
// loyalty entities. Wire types from punchcard-api convert in via `From`
// impls so the rest of the crate never handles raw service payloads.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use punchcard_api::types::{CustomerProfileResponse, RewardResponse};
use punchcard_api::RedemptionWireKind;

/// Width of the idempotency bucket applied to capture timestamps.
///
/// Coarser than the debounce window: a re-scan of the same code that
/// survives debouncing (e.g. after "scan again") still collapses to one
/// server-side effect if it lands in the same bucket.
const IDEMPOTENCY_WINDOW_SECS: i64 = 10;

// ── Scan events ──────────────────────────────────────────────────────

/// Symbol type reported by the capture device for one decode.
///
/// Only [`Qr`](Self::Qr) participates in the redemption workflow; the
/// debouncer drops everything else without interrupting the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeFormat {
    Qr,
    Ean13,
    Code128,
    DataMatrix,
    Other,
}

/// One decode from the capture device.
///
/// Created by the device callback, consumed exactly once by the
/// workflow, discarded after a terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub format: CodeFormat,
    /// Opaque encoded identifier (customer token or reward token).
    pub payload: String,
    pub captured_at: DateTime<Utc>,
}

impl ScanEvent {
    pub fn qr(payload: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            format: CodeFormat::Qr,
            payload: payload.into(),
            captured_at,
        }
    }
}

// ── Redemption transactions ──────────────────────────────────────────

/// What a submitted scan asks the service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RedemptionKind {
    /// Grant one loyalty stamp to the scanned customer.
    StampGrant,
    /// Exchange accumulated stamps for a reward.
    RewardRedemption,
}

impl RedemptionKind {
    pub(crate) fn to_wire(self) -> RedemptionWireKind {
        match self {
            Self::StampGrant => RedemptionWireKind::StampGrant,
            Self::RewardRedemption => RedemptionWireKind::RewardRedemption,
        }
    }
}

/// Request-level deduplication key.
///
/// Derived deterministically from (kind, subject, capture-time bucket):
/// stable across retries of the same logical request, distinct across
/// distinct scans. The service collapses submissions sharing a key into
/// one effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Derive the key for one logical scan.
    pub fn derive(kind: RedemptionKind, subject_token: &str, captured_at: DateTime<Utc>) -> Self {
        let bucket = captured_at.timestamp().div_euclid(IDEMPOTENCY_WINDOW_SECS);
        Self(format!("{kind}:{subject_token}:{bucket}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The transaction submitted to the loyalty service.
#[derive(Debug, Clone)]
pub struct RedemptionRequest {
    pub kind: RedemptionKind,
    /// Identifier decoded from the scan payload.
    pub subject_token: String,
    /// Credential of the authenticated operator, from the session context.
    pub actor_token: SecretString,
    pub idempotency_key: IdempotencyKey,
}

impl RedemptionRequest {
    /// Build a request from an accepted scan and the operator credential.
    pub fn from_scan(kind: RedemptionKind, event: &ScanEvent, actor_token: SecretString) -> Self {
        Self {
            kind,
            subject_token: event.payload.clone(),
            actor_token,
            idempotency_key: IdempotencyKey::derive(kind, &event.payload, event.captured_at),
        }
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Terminal classification of one transaction attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeStatus {
    Granted,
    AlreadyRedeemed,
    Ineligible,
    TransientFailure,
    FatalFailure,
}

impl OutcomeStatus {
    /// Business rejections are informational and never retried.
    pub fn is_business_rejection(self) -> bool {
        matches!(self, Self::AlreadyRedeemed | Self::Ineligible)
    }
}

/// Result of a redemption transaction, consumed by the workflow to
/// decide the next UI-visible state. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedemptionOutcome {
    pub status: OutcomeStatus,
    /// Populated only for a successful reward redemption; ordered as
    /// the service returned them.
    pub rewards_eligible: Vec<Reward>,
}

impl RedemptionOutcome {
    pub fn of(status: OutcomeStatus) -> Self {
        Self {
            status,
            rewards_eligible: Vec::new(),
        }
    }

    pub fn granted(rewards_eligible: Vec<Reward>) -> Self {
        Self {
            status: OutcomeStatus::Granted,
            rewards_eligible,
        }
    }
}

// ── Loyalty entities ─────────────────────────────────────────────────

/// A reward catalogue entry surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: Uuid,
    pub name: String,
    pub picture: Option<Url>,
    pub description: String,
}

impl From<RewardResponse> for Reward {
    fn from(wire: RewardResponse) -> Self {
        Self {
            id: wire.reward_id,
            name: wire.name,
            // Unparseable picture URLs degrade to no picture.
            picture: wire.picture.and_then(|p| p.parse().ok()),
            description: wire.description,
        }
    }
}

/// The authenticated customer's loyalty standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub stamps: u32,
    pub eligible_rewards: Vec<Reward>,
}

impl From<CustomerProfileResponse> for CustomerProfile {
    fn from(wire: CustomerProfileResponse) -> Self {
        Self {
            stamps: wire.stamps,
            eligible_rewards: wire.eligible_rewards.into_iter().map(Reward::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[test]
    fn idempotency_key_is_deterministic() {
        let a = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-1", at(1_710_000_003));
        let b = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-1", at(1_710_000_003));
        assert_eq!(a, b);
    }

    #[test]
    fn idempotency_key_stable_within_bucket() {
        let a = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-1", at(1_710_000_001));
        let b = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-1", at(1_710_000_009));
        assert_eq!(a, b);
    }

    #[test]
    fn idempotency_key_differs_across_buckets() {
        let a = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-1", at(1_710_000_009));
        let b = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-1", at(1_710_000_010));
        assert_ne!(a, b);
    }

    #[test]
    fn idempotency_key_differs_across_subjects_and_kinds() {
        let t = at(1_710_000_000);
        let stamp = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-1", t);
        let other = IdempotencyKey::derive(RedemptionKind::StampGrant, "cust-2", t);
        let reward = IdempotencyKey::derive(RedemptionKind::RewardRedemption, "cust-1", t);
        assert_ne!(stamp, other);
        assert_ne!(stamp, reward);
    }

    #[test]
    fn reward_conversion_drops_bad_picture_url() {
        let wire = RewardResponse {
            reward_id: Uuid::new_v4(),
            name: "Free espresso".into(),
            picture: Some("not a url".into()),
            description: String::new(),
        };
        let reward = Reward::from(wire);
        assert!(reward.picture.is_none());
    }
}
