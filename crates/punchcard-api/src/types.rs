// Loyalty service wire types
//
// Models for the punchcard service's JSON API. Fields use
// `#[serde(default)]` liberally because the service omits optional
// fields rather than sending nulls.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Authentication ───────────────────────────────────────────────────

/// Body of `POST /api/auth/login` on success.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// ── Rewards ──────────────────────────────────────────────────────────

/// A reward catalogue entry as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardResponse {
    pub reward_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub description: String,
}

// ── Customer profile ─────────────────────────────────────────────────

/// The authenticated customer's loyalty standing, from `GET /api/users/self`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfileResponse {
    #[serde(default)]
    pub stamps: u32,
    #[serde(default)]
    pub eligible_rewards: Vec<RewardResponse>,
}

// ── Redemptions ──────────────────────────────────────────────────────

/// Transaction kind on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionWireKind {
    StampGrant,
    RewardRedemption,
}

/// Body of `POST /api/redemptions`.
///
/// The operator credential rides the `Authorization` header and the
/// deduplication key rides the `Idempotency-Key` header; neither is
/// duplicated in the body.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionSubmission {
    pub kind: RedemptionWireKind,
    pub subject_token: String,
}

/// Discriminated result of a redemption submission.
///
/// ```json
/// { "status": "granted", "eligible_rewards": [...] }
/// { "status": "already_redeemed" }
/// { "status": "ineligible" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RedemptionResponse {
    /// The stamp was granted or the reward redemption was accepted.
    /// `eligible_rewards` is populated only for reward redemptions.
    Granted {
        #[serde(default)]
        eligible_rewards: Vec<RewardResponse>,
    },
    /// The subject code was already consumed by an earlier submission.
    AlreadyRedeemed,
    /// The subject is not eligible (not enough stamps, expired code).
    Ineligible,
}
