// ── Scan event intake ──
//
// The capture device delivers decodes through a callback on the host
// side; `CaptureFeed` bridges that callback into the single event
// stream the workflow consumes. `ScanDebouncer` sits between the
// stream and the state machine, suppressing re-decodes of the code
// sitting in front of a live camera feed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

use crate::model::{CodeFormat, ScanEvent};

// ── Debouncer ────────────────────────────────────────────────────────

/// Suppresses duplicate/overlapping scan events from the same physical
/// code.
///
/// Pure function of its internal state -- no I/O, no clock reads; all
/// timing comes from the events' own capture timestamps.
pub struct ScanDebouncer {
    window: Duration,
    last_accepted: Option<(String, DateTime<Utc>)>,
}

impl ScanDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Decide whether `event` is a fresh scan.
    ///
    /// Rejects when the symbol type is not QR, or when the payload
    /// repeats the last accepted payload inside the debounce window.
    /// An accepted event becomes the new last-accepted reference.
    pub fn accept(&mut self, event: &ScanEvent) -> bool {
        if event.format != CodeFormat::Qr {
            trace!(format = ?event.format, "dropping non-QR decode");
            return false;
        }

        if let Some((payload, accepted_at)) = &self.last_accepted {
            if *payload == event.payload {
                let delta = event.captured_at - *accepted_at;
                // Negative deltas (clock skew) count as within-window.
                let within = match delta.to_std() {
                    Ok(d) => d < self.window,
                    Err(_) => true,
                };
                if within {
                    trace!(payload = %event.payload, "debounced duplicate scan");
                    return false;
                }
            }
        }

        self.last_accepted = Some((event.payload.clone(), event.captured_at));
        true
    }
}

// ── Capture feed ─────────────────────────────────────────────────────

/// Bridge from the capture device's decode callback to the workflow's
/// event stream.
///
/// The device adapter holds the feed and pushes one [`ScanEvent`] per
/// decode; the workflow drives the returned stream as its single
/// subscriber. Tests substitute a synthetic feed for determinism.
pub struct CaptureFeed {
    tx: mpsc::UnboundedSender<ScanEvent>,
}

impl CaptureFeed {
    /// Create a feed and the stream the workflow will consume.
    pub fn channel() -> (Self, UnboundedReceiverStream<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, UnboundedReceiverStream::new(rx))
    }

    /// Deliver one decode. Returns `false` if the workflow side has
    /// shut down and the event was discarded.
    pub fn push(&self, event: ScanEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}
