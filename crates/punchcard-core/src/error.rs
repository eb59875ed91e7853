// ── Core error types ──
//
// User-facing errors from punchcard-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<punchcard_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants. The workflow itself communicates
// failure through outcome values; these errors cover the surrounding
// plumbing (authorization queries, profile refresh, configuration).

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    #[error("No operator credential available")]
    NoCredential,

    // ── Device errors ────────────────────────────────────────────────
    #[error("Capture authorization query failed: {message}")]
    AuthorizationQueryFailed { message: String },

    // ── Service errors ───────────────────────────────────────────────
    #[error("Service unreachable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Service error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<punchcard_api::Error> for CoreError {
    fn from(err: punchcard_api::Error) -> Self {
        match err {
            punchcard_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            punchcard_api::Error::SessionExpired => CoreError::SessionExpired,
            punchcard_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ServiceUnavailable {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            punchcard_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            punchcard_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            punchcard_api::Error::Service {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            punchcard_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
