// Monotonic timestamp capture for detection bookkeeping
//
// Wraps a monotonic clock read into a comparable nanosecond value anchored at
// a process-wide epoch, paired with a process-wide sequence counter so two
// captures landing in the same nanosecond still order deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Anchor for converting `Instant` readings into absolute nanosecond values.
static PROCESS_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Capture sequence counter shared by every detector instance in the process.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// High-precision capture: monotonic nanoseconds plus a unique sequence number.
///
/// The derived ordering compares nanoseconds first and falls back to the
/// sequence number, so captures are strictly totally ordered even when the
/// clock ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DetectionTimestamp {
    /// Nanoseconds since the process epoch (never decreases)
    pub nanos: u64,
    /// Process-wide unique capture sequence number
    pub sequence: u64,
}

impl DetectionTimestamp {
    /// Nanoseconds elapsed from `earlier` to `self`.
    ///
    /// Saturates at zero if `earlier` was actually captured after `self`.
    pub fn nanos_since(&self, earlier: DetectionTimestamp) -> u64 {
        self.nanos.saturating_sub(earlier.nanos)
    }
}

/// Capture the current monotonic timestamp.
pub fn capture() -> DetectionTimestamp {
    DetectionTimestamp {
        nanos: PROCESS_EPOCH.elapsed().as_nanos() as u64,
        sequence: SEQUENCE.fetch_add(1, Ordering::Relaxed),
    }
}
