// ── Reactive profile store ──
//
// Single-slot store for the authenticated customer's loyalty standing.
// The snapshot swaps atomically; subscribers learn about updates through
// a watch channel and re-read the snapshot on notification.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;

use crate::model::CustomerProfile;

/// Reactive store for the current [`CustomerProfile`].
///
/// Reads are wait-free; the workflow applies a fresh profile after a
/// successful stamp grant and the presentation layer re-renders on the
/// version bump.
pub struct ProfileStore {
    profile: ArcSwapOption<CustomerProfile>,
    version: watch::Sender<u64>,
}

impl ProfileStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            profile: ArcSwapOption::const_empty(),
            version,
        }
    }

    /// The latest profile, if one has been loaded this session.
    pub fn snapshot(&self) -> Option<Arc<CustomerProfile>> {
        self.profile.load_full()
    }

    /// Replace the stored profile and notify subscribers.
    pub fn apply(&self, profile: CustomerProfile) {
        self.profile.store(Some(Arc::new(profile)));
        self.version.send_modify(|v| *v += 1);
    }

    /// Subscribe to profile updates. The receiver yields a bumped
    /// version number; call [`snapshot`](Self::snapshot) to read.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}
