// Loyalty service authentication
//
// Bearer-token login/logout. The login endpoint returns a token the
// caller passes explicitly to every authenticated request; the client
// itself stores no session state.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::LoginResponse;

impl ApiClient {
    /// Authenticate with the service using email/password.
    ///
    /// `POST /api/auth/login`
    ///
    /// Returns the bearer token to use for subsequent requests. The
    /// token is a secret; callers should hand it to a session context
    /// rather than logging or persisting it themselves.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.api_url("auth/login")?;

        debug!("logging in at {}", url);

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let login: LoginResponse = Self::parse_body(resp).await?;

        debug!("login successful");
        Ok(SecretString::from(login.token))
    }

    /// End the current session.
    ///
    /// `POST /api/auth/logout`
    ///
    /// Best-effort: the server invalidates the token; a failure here
    /// leaves the token to expire on its own.
    pub async fn logout(&self, token: &SecretString) -> Result<(), Error> {
        let url = self.api_url("auth/logout")?;

        debug!("logging out at {}", url);

        let builder = Self::apply_bearer(self.http().post(url), token);
        let _resp = builder.send().await.map_err(Error::Transport)?;

        debug!("logout complete");
        Ok(())
    }
}
