// ── Session context seam ──
//
// The auth subsystem owns login, token refresh, and credential storage.
// The workflow only ever asks one question: is there a usable operator
// credential right now?

use secrecy::SecretString;

/// Narrow interface to the auth subsystem.
pub trait SessionContext {
    /// The current operator credential, or `None` when the session is
    /// unauthenticated or has been invalidated.
    fn current_credential(&self) -> Option<SecretString>;
}

/// A fixed-credential session for tests and simple hosts.
pub struct StaticSession {
    credential: Option<SecretString>,
}

impl StaticSession {
    pub fn authenticated(token: SecretString) -> Self {
        Self {
            credential: Some(token),
        }
    }

    pub fn anonymous() -> Self {
        Self { credential: None }
    }
}

impl SessionContext for StaticSession {
    fn current_credential(&self) -> Option<SecretString> {
        self.credential.clone()
    }
}
