//! Injectable millisecond clock.
//!
//! The match countdown and the item scheduler are wall-clock based. They read
//! time through [`Clock`] so tests and replays can drive time explicitly with
//! a [`ManualClock`] while a live host uses [`SystemClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of monotonic timestamps in milliseconds.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds. Must never decrease.
    fn now_ms(&self) -> u64;
}

/// Real time, measured from the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock that reads zero now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Manually advanced clock.
///
/// Clones share the same time, so a test can hand one clone to the match
/// controller and keep another to advance it.
///
/// # Example
///
/// ```
/// use sawclash_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let shared = clock.clone();
///
/// clock.advance(16);
/// assert_eq!(shared.now_ms(), 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock at the given time.
    #[must_use]
    pub fn starting_at(ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(ms)),
        }
    }

    /// Moves time forward.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the time; ignored if it would move the clock backwards.
    pub fn set(&self, ms: u64) {
        self.now.fetch_max(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_never_goes_back() {
        let clock = ManualClock::starting_at(100);
        clock.set(50);
        assert_eq!(clock.now_ms(), 100);
        clock.set(150);
        assert_eq!(clock.now_ms(), 150);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn clock_is_object_safe() {
        fn _accepts_boxed(_clock: Box<dyn Clock>) {}
        _accepts_boxed(Box::new(ManualClock::new()));
    }
}
