//! Cache Statistics Module
//!
//! `CacheStats` is the point-in-time storage breakdown; `CacheMetrics` keeps
//! running counters of hits, misses and removals.

use serde::Serialize;

// == Cache Stats ==
/// Storage breakdown at the moment of the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries currently stored, swept or not
    pub total: usize,
    /// Stored entries that are still fresh
    pub valid: usize,
    /// Stored entries that are expired but not yet removed
    pub expired: usize,
    /// Configured capacity
    pub max_size: usize,
}

// == Cache Metrics ==
/// Running counters since construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheMetrics {
    /// Reads that returned a payload
    pub hits: u64,
    /// Reads that found nothing or found an expired entry
    pub misses: u64,
    /// Entries removed to make room for a new key
    pub evictions: u64,
    /// Expired entries removed by a read or a sweep
    pub expirations: u64,
    /// Entries removed by delete, invalidation or clear
    pub invalidations: u64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }
}
