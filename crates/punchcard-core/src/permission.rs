// ── Camera capability gate ──
//
// Acquires and caches the capture-device authorization. The underlying
// provider is queried exactly once per gate lifetime; a retry is a
// user-initiated action (the presentation layer calls `reset` through
// the workflow's retry command).

use tracing::{debug, warn};

use crate::error::CoreError;

/// Authorization state of the capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// No query has completed yet.
    Unknown,
    Granted,
    Denied,
}

/// Platform seam for the camera-capability query.
///
/// Implemented by the host over whatever the OS offers; tests substitute
/// synthetic authorizers.
pub trait CaptureAuthorizer {
    /// Ask the platform whether camera capture is authorized.
    fn request_authorization(&self) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

/// Caches the capability query for the lifetime of a screen.
///
/// A failed query caches `Denied` -- the operator resolves it through
/// OS settings, not by the gate retrying on its own.
pub struct PermissionGate<A> {
    authorizer: A,
    cached: Option<PermissionStatus>,
}

impl<A: CaptureAuthorizer> PermissionGate<A> {
    pub fn new(authorizer: A) -> Self {
        Self {
            authorizer,
            cached: None,
        }
    }

    /// The cached status, or `Unknown` before the first query completes.
    pub fn status(&self) -> PermissionStatus {
        self.cached.unwrap_or(PermissionStatus::Unknown)
    }

    /// Return the cached status, querying the provider on first use.
    pub async fn check_or_request(&mut self) -> PermissionStatus {
        if let Some(status) = self.cached {
            return status;
        }

        let status = match self.authorizer.request_authorization().await {
            Ok(true) => PermissionStatus::Granted,
            Ok(false) => PermissionStatus::Denied,
            Err(e) => {
                warn!(error = %e, "authorization query failed -- treating as denied");
                PermissionStatus::Denied
            }
        };

        debug!(?status, "capture authorization resolved");
        self.cached = Some(status);
        status
    }

    /// Forget the cached result so the next check queries the provider
    /// again. Only meaningful as part of a user-initiated retry.
    pub fn reset(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct CountingAuthorizer {
        granted: bool,
        queries: AtomicU32,
    }

    impl CaptureAuthorizer for &CountingAuthorizer {
        async fn request_authorization(&self) -> Result<bool, CoreError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.granted)
        }
    }

    #[tokio::test]
    async fn queries_provider_exactly_once() {
        let authorizer = CountingAuthorizer {
            granted: true,
            queries: AtomicU32::new(0),
        };
        let mut gate = PermissionGate::new(&authorizer);

        assert_eq!(gate.status(), PermissionStatus::Unknown);
        assert_eq!(gate.check_or_request().await, PermissionStatus::Granted);
        assert_eq!(gate.check_or_request().await, PermissionStatus::Granted);
        assert_eq!(authorizer.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reset_allows_a_fresh_query() {
        let authorizer = CountingAuthorizer {
            granted: false,
            queries: AtomicU32::new(0),
        };
        let mut gate = PermissionGate::new(&authorizer);

        assert_eq!(gate.check_or_request().await, PermissionStatus::Denied);
        gate.reset();
        assert_eq!(gate.status(), PermissionStatus::Unknown);
        assert_eq!(gate.check_or_request().await, PermissionStatus::Denied);
        assert_eq!(authorizer.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_query_caches_denied() {
        struct FailingAuthorizer;

        impl CaptureAuthorizer for FailingAuthorizer {
            async fn request_authorization(&self) -> Result<bool, CoreError> {
                Err(CoreError::AuthorizationQueryFailed {
                    message: "provider unavailable".into(),
                })
            }
        }

        let mut gate = PermissionGate::new(FailingAuthorizer);
        assert_eq!(gate.check_or_request().await, PermissionStatus::Denied);
        assert_eq!(gate.status(), PermissionStatus::Denied);
    }
}
