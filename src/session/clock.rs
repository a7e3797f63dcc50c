//! Session Clock
//!
//! Maps the tokio monotonic clock onto epoch milliseconds. The game core
//! only ever sees `u64` epoch millis; the actor needs `Instant`s to sleep
//! until the next deadline. Reading tokio's clock keeps paused-time tests
//! deterministic.

use std::time::Duration;
use tokio::time::Instant;

/// Epoch-millisecond clock anchored to a tokio `Instant`.
#[derive(Clone, Copy, Debug)]
pub struct SessionClock {
    base_epoch_ms: u64,
    origin: Instant,
}

impl SessionClock {
    /// Anchor to the current wall-clock time.
    pub fn system() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self::starting_at(u64::try_from(now).unwrap_or(0))
    }

    /// Anchor to a fixed epoch timestamp. Used by tests and replays.
    pub fn starting_at(epoch_ms: u64) -> Self {
        Self {
            base_epoch_ms: epoch_ms,
            origin: Instant::now(),
        }
    }

    /// Current time in epoch milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.base_epoch_ms + self.origin.elapsed().as_millis() as u64
    }

    /// The `Instant` corresponding to `epoch_ms`.
    ///
    /// Timestamps before the anchor map to the anchor itself.
    pub fn instant_at(&self, epoch_ms: u64) -> Instant {
        self.origin + Duration::from_millis(epoch_ms.saturating_sub(self.base_epoch_ms))
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::system()
    }
}
