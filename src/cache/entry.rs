//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an absolute expiry.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value and the instant after which it is logically absent.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Expiration instant, computed at insertion as `now + ttl`
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// A zero `ttl` yields an entry that is already expired.
    pub fn new(value: String, ttl: Duration) -> Self {
        Self::with_start(value, Instant::now(), ttl)
    }

    /// Creates an entry expiring `ttl` after `start`.
    ///
    /// A `ttl` too large for the platform clock saturates to the start instant
    /// plus the largest offset `Instant` accepts.
    pub fn with_start(value: String, start: Instant, ttl: Duration) -> Self {
        let expires_at = start
            .checked_add(ttl)
            .unwrap_or_else(|| far_future(start));

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is greater
    /// than or equal to `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a caller-supplied instant.
    ///
    /// The sweep evaluates every entry against a single scan-start instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining lifetime, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Largest instant reachable from `start` by halving the offset until it fits.
fn far_future(start: Instant) -> Instant {
    let mut offset = Duration::from_secs(u64::MAX / 2);
    loop {
        if let Some(instant) = start.checked_add(offset) {
            return instant;
        }
        offset /= 2;
        if offset.is_zero() {
            return start;
        }
    }
}
