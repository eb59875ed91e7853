// ── Runtime workflow configuration ──
//
// These types describe *how* the workflow talks to the loyalty service
// and how aggressively it suppresses duplicate scans. They never touch
// disk -- the host app constructs a `WorkflowConfig` and hands it in.
// Session credential storage is the auth subsystem's concern.

use std::time::Duration;

use url::Url;

use crate::redeem::RetryPolicy;

/// Configuration for a single scan-to-redemption workflow instance.
///
/// Built by the host, passed to [`Workflow`](crate::workflow::Workflow) --
/// core never reads config files.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Loyalty service URL (e.g., `https://api.punchcard.app`).
    pub base_url: Url,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Window within which repeated scans of the same payload collapse
    /// to one event.
    pub debounce_window: Duration,
    /// Retry behavior for transient submission failures.
    pub retry: RetryPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.punchcard.app"
                .parse()
                .expect("default base URL is valid"),
            timeout: Duration::from_secs(8),
            debounce_window: Duration::from_millis(2000),
            retry: RetryPolicy::default(),
        }
    }
}

impl WorkflowConfig {
    /// Derive the transport configuration for building an
    /// [`ApiClient`](punchcard_api::ApiClient).
    pub fn transport(&self) -> punchcard_api::transport::TransportConfig {
        punchcard_api::transport::TransportConfig {
            timeout: self.timeout,
        }
    }
}
