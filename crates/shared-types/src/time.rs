//! Time source port.
//!
//! Every deadline, delivery delay and retention check reads time through
//! [`TimeSource`] so tests can drive the clock deterministically.

use std::sync::atomic::{AtomicU64, Ordering};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Time source for consistent timestamp handling.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Manually driven time source.
///
/// `with_auto_advance` moves the clock forward on every read, which lets a
/// deadline-bounded loop terminate after a predictable number of iterations.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
    step: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
            step: AtomicU64::new(0),
        }
    }

    /// Advance by `step_ms` after every `now()` call.
    pub fn with_auto_advance(initial: Timestamp, step_ms: u64) -> Self {
        Self {
            time: AtomicU64::new(initial),
            step: AtomicU64::new(step_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        let step = self.step.load(Ordering::SeqCst);
        self.time.fetch_add(step, Ordering::SeqCst)
    }
}
