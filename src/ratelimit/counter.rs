//! Fixed-window counter record.

use std::time::{Duration, Instant};

/// Length of the tumbling window. Both caps are per-second.
pub const WINDOW: Duration = Duration::from_secs(1);

/// Accumulated usage for one scope (a phone number, or the whole account)
/// within the current fixed window.
///
/// A `WindowCounter` is not synchronized by itself; the limiter wraps each
/// record in a lock and mutates it only while that lock is held.
#[derive(Debug, Clone, Copy)]
pub struct WindowCounter {
    /// Admissions recorded in the current window.
    count: u32,
    /// When the current window began. Only ever moves forward.
    window_start: Instant,
    /// Most recent admission for this record. Drives idle eviction of
    /// per-number records; the account record is never evicted.
    last_used: Instant,
}

impl WindowCounter {
    /// Create a zeroed counter whose window starts at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
            last_used: now,
        }
    }

    /// Reset the window if it has expired at `now`.
    ///
    /// Returns `true` if a reset happened. Must be called before the capacity
    /// check so the decision is made against the current window.
    pub fn maybe_reset(&mut self, now: Instant) -> bool {
        if now.duration_since(self.window_start) >= WINDOW {
            self.count = 0;
            self.window_start = now;
            true
        } else {
            false
        }
    }

    /// Whether one more admission fits under `limit` (pre-increment check).
    pub fn has_capacity(&self, limit: u32) -> bool {
        self.count < limit
    }

    /// Record one admission at `now`.
    pub fn record(&mut self, now: Instant) {
        self.count += 1;
        self.last_used = now;
    }

    /// Current count in this window.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether this record has been unused longer than `timeout` as of `now`.
    pub fn idle_since(&self, now: Instant, timeout: Duration) -> bool {
        now.duration_since(self.last_used) > timeout
    }
}
