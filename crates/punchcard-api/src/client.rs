// Loyalty service HTTP client
//
// Wraps `reqwest::Client` with service URL construction and response
// decoding. Endpoint families (auth, users, rewards, redemptions) are
// implemented as inherent methods via separate files to keep this
// module focused on transport mechanics.
//
// The client holds no credential state: every authenticated call takes
// the bearer token explicitly, so a single client instance can serve
// any session.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the punchcard loyalty service.
///
/// Methods return decoded payloads; HTTP status handling and error
/// shaping happen here so callers only ever see [`Error`] values.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` should be the service root (e.g. `https://api.punchcard.app`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/api/{path}")).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach a bearer token to a request builder.
    pub(crate) fn apply_bearer(builder: RequestBuilder, token: &SecretString) -> RequestBuilder {
        builder.bearer_auth(token.expose_secret())
    }

    /// Send an authenticated GET request and decode the response.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &SecretString,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let builder = Self::apply_bearer(self.http.get(url), token);
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send an authenticated POST request with a JSON body and decode
    /// the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &SecretString,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let builder = Self::apply_bearer(self.http.post(url), token).json(body);
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Decode a response body, shaping HTTP-level failures into [`Error`].
    ///
    /// - 401 means the bearer token is no longer valid.
    /// - 403 means the operator lacks the required role (e.g. a customer
    ///   account calling an employee-only endpoint).
    /// - Other non-2xx statuses become [`Error::Service`] with a body
    ///   preview; 5xx statuses classify as transient upstream.
    pub(crate) async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: "insufficient permissions (HTTP 403)".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Service {
                message: body[..body.len().min(200)].to_owned(),
                code: None,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
