// Reward catalogue endpoints

use secrecy::SecretString;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::RewardResponse;

impl ApiClient {
    /// List the rewards a scanned customer is currently eligible for.
    ///
    /// `GET /api/customers/{customer_token}/rewards`
    ///
    /// Employee-scoped: the bearer token must belong to an operator
    /// account, otherwise the service answers 403.
    pub async fn eligible_rewards(
        &self,
        token: &SecretString,
        customer_token: &str,
    ) -> Result<Vec<RewardResponse>, Error> {
        let url = self.api_url(&format!("customers/{customer_token}/rewards"))?;
        debug!(customer_token, "listing eligible rewards");
        self.get(url, token).await
    }
}
