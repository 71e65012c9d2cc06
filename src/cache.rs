// Single-slot TTL cache for the fetched result.
//
// The expiry clock is injected through the `Clock` trait so tests can move
// time by hand instead of sleeping.

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clock seam
// ---------------------------------------------------------------------------

/// Monotonic time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ---------------------------------------------------------------------------
// TtlCache
// ---------------------------------------------------------------------------

/// Holds at most one value together with the instant it was stored.
/// A slot older than the TTL reads as empty.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Option<(T, Instant)>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    /// The cached value, if one was stored less than a TTL before `now`.
    pub fn get(&self, now: Instant) -> Option<T> {
        let (value, stored_at) = self.slot.as_ref()?;
        if now.duration_since(*stored_at) >= self.ttl {
            return None;
        }
        Some(value.clone())
    }

    /// Store `value`, replacing whatever the slot held.
    pub fn put(&mut self, value: T, now: Instant) {
        self.slot = Some((value, now));
    }

    /// Drop the slot so the next load re-fetches regardless of age.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
