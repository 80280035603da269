//! Core rate accounting engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::counter::WindowCounter;

/// The admission-control engine enforcing both send caps.
///
/// Tracks one [`WindowCounter`] per phone number plus a single account-wide
/// counter shared by every call. Thread-safe and shared across tasks behind an
/// `Arc`; all counter state is owned here and only reachable through
/// [`RateLimiter::can_send`] and the eviction sweep.
pub struct RateLimiter {
    /// Cap on admissions per phone number per second.
    max_per_number: u32,
    /// Cap on admissions across the whole account per second.
    max_per_account: u32,
    /// How long a number record may sit unused before the sweep reclaims it.
    inactivity_timeout: Duration,
    /// Per-number counters, created lazily on first use. Entries are removed
    /// only by [`RateLimiter::sweep_once`].
    numbers: DashMap<String, Arc<Mutex<WindowCounter>>>,
    /// The account-wide counter. Never evicted.
    account: Mutex<WindowCounter>,
}

impl RateLimiter {
    /// Create a new engine.
    ///
    /// The caps must already be validated as positive and the timeout as
    /// non-zero by the configuration layer; the engine does not re-check them.
    pub fn new(max_per_number: u32, max_per_account: u32, inactivity_timeout: Duration) -> Self {
        debug!(
            max_per_number = max_per_number,
            max_per_account = max_per_account,
            "Rate limiter initialized"
        );
        Self {
            max_per_number,
            max_per_account,
            inactivity_timeout,
            numbers: DashMap::new(),
            account: Mutex::new(WindowCounter::new(Instant::now())),
        }
    }

    /// Decide whether a message to `phone_number` may be sent right now.
    ///
    /// Returns `false` both for an empty number and for either cap being
    /// exhausted; callers only ever see the boolean.
    pub fn can_send(&self, phone_number: &str) -> bool {
        self.can_send_at(phone_number, Instant::now())
    }

    /// Decision path with an injected clock, so tests control window
    /// boundaries without sleeping.
    pub(crate) fn can_send_at(&self, phone_number: &str, now: Instant) -> bool {
        if phone_number.is_empty() {
            warn!("Received empty phone number");
            return false;
        }

        // Get or create the per-number record. The Arc is cloned out so the
        // store's shard lock is released before the record lock is taken.
        let record = self
            .numbers
            .entry(phone_number.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(WindowCounter::new(now))))
            .clone();

        // Lock order is always number record first, then the account record.
        // Both are held for the whole read-check-increment so two concurrent
        // callers can never both observe room and overshoot a cap.
        let mut number = record.lock();
        let mut account = self.account.lock();

        // Each scope's window resets off its own start time; the two windows
        // may drift out of phase, which is intended.
        if number.maybe_reset(now) {
            debug!(phone_number = %phone_number, "Resetting phone number window");
        }
        if account.maybe_reset(now) {
            debug!("Resetting account-wide window");
        }

        let number_allowed = number.has_capacity(self.max_per_number);
        let account_allowed = account.has_capacity(self.max_per_account);

        if number_allowed && account_allowed {
            number.record(now);
            account.record(now);
            trace!(
                phone_number = %phone_number,
                number_count = number.count(),
                account_count = account.count(),
                "Message allowed"
            );
            true
        } else {
            debug!(
                phone_number = %phone_number,
                number_count = number.count(),
                number_limit = self.max_per_number,
                account_count = account.count(),
                account_limit = self.max_per_account,
                "Message blocked"
            );
            false
        }
    }

    /// Run one eviction pass: drop every number record that has been idle
    /// longer than the inactivity timeout as of `now`.
    ///
    /// Returns the number of records removed. Concurrent admissions during the
    /// scan are fine; a number admitted between scan and removal simply starts
    /// a fresh window on its next call.
    pub(crate) fn sweep_once(&self, now: Instant) -> usize {
        let idle: Vec<String> = self
            .numbers
            .iter()
            .filter(|entry| entry.value().lock().idle_since(now, self.inactivity_timeout))
            .map(|entry| entry.key().clone())
            .collect();

        for number in &idle {
            trace!(phone_number = %number, "Removed inactive phone number");
            self.numbers.remove(number);
        }

        if !idle.is_empty() {
            debug!(count = idle.len(), "Cleaned up inactive phone numbers");
        }
        idle.len()
    }

    /// Number of phone numbers currently tracked.
    pub fn tracked_numbers(&self) -> usize {
        self.numbers.len()
    }

    /// Current window count for a phone number, if tracked.
    ///
    /// Primarily useful for tests and diagnostics.
    pub fn number_count(&self, phone_number: &str) -> Option<u32> {
        self.numbers
            .get(phone_number)
            .map(|record| record.value().lock().count())
    }

    /// Current account-wide window count.
    pub fn account_count(&self) -> u32 {
        self.account.lock().count()
    }
}
