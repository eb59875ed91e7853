// Redemption submission endpoint
//
// A single network attempt with no retry -- retry and backoff live in
// punchcard-core, which reuses the same idempotency key across attempts.

use secrecy::SecretString;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{RedemptionResponse, RedemptionSubmission};

/// Header carrying the request-level deduplication key. The service
/// collapses submissions sharing a key into one effect.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

impl ApiClient {
    /// Submit a stamp grant or reward redemption.
    ///
    /// `POST /api/redemptions` with an `Idempotency-Key` header.
    ///
    /// Business rejections (`already_redeemed`, `ineligible`) are part
    /// of the success envelope, not errors: the submission reached the
    /// service and was answered.
    pub async fn submit_redemption(
        &self,
        token: &SecretString,
        idempotency_key: &str,
        submission: &RedemptionSubmission,
    ) -> Result<RedemptionResponse, Error> {
        let url = self.api_url("redemptions")?;

        debug!(kind = ?submission.kind, idempotency_key, "POST {}", url);

        let builder = Self::apply_bearer(self.http().post(url), token)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(submission);
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }
}
