//! Cache Entry Module
//!
//! A stored value paired with its deadline in a single record.

use std::time::{Duration, Instant};

/// Upper bound applied to every TTL so `now + ttl` cannot overflow.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A value and the instant after which it stops being visible.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Absolute deadline, None = written while expiration was disabled
    pub deadline: Option<Instant>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an entry written at `now`, expiring `ttl` later when given.
    pub fn new(value: V, now: Instant, ttl: Option<Duration>) -> Self {
        Self {
            value,
            deadline: ttl.map(|ttl| now + ttl.min(MAX_TTL)),
        }
    }

    // == Is Expired ==
    /// Checks the entry against `now` for a cache with expiration enabled.
    ///
    /// Deadlines are exclusive: a read at exactly the deadline is still live.
    /// An entry without a deadline counts as expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => now > deadline,
            None => true,
        }
    }
}
