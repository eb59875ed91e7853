// Customer profile endpoint

use secrecy::SecretString;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::CustomerProfileResponse;

impl ApiClient {
    /// Fetch the authenticated customer's loyalty standing.
    ///
    /// `GET /api/users/self`
    pub async fn self_info(&self, token: &SecretString) -> Result<CustomerProfileResponse, Error> {
        let url = self.api_url("users/self")?;
        debug!("fetching self info");
        self.get(url, token).await
    }
}
