//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::Arc;

// == Cache Entry ==
/// A stored payload with the metadata needed for expiry and FIFO order.
#[derive(Debug)]
pub struct CacheEntry<T> {
    /// The stored payload, handed out as read-only snapshots
    pub payload: Arc<T>,
    /// Insertion timestamp (clock milliseconds)
    pub stored_at: u64,
    /// Lifetime fixed at insertion, in milliseconds
    pub ttl_ms: u64,
    /// Insertion sequence number
    pub seq: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    pub fn new(payload: Arc<T>, stored_at: u64, ttl_ms: u64, seq: u64) -> Self {
        Self {
            payload,
            stored_at,
            ttl_ms,
            seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: the entry is still fresh when exactly `ttl_ms`
    /// has elapsed and expires one millisecond later. Every read, stats
    /// count and sweep goes through this predicate.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at) > self.ttl_ms
    }

    /// Last instant at which the entry is still fresh.
    pub fn expires_at(&self) -> u64 {
        self.stored_at.saturating_add(self.ttl_ms)
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at().saturating_sub(now_ms)
    }
}
