//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with FIFO tracking and TTL
//! expiration. The store is single-owner; `ResponseCache` wraps it for
//! sharing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheMetrics, CacheStats, Clock, InsertionOrder, SystemClock};
use crate::config::{CacheConfig, DEFAULT_TTL_MS};

// == Cache Store ==
/// Bounded key/value store with per-entry TTL and FIFO eviction.
#[derive(Debug)]
pub struct CacheStore<T, C = SystemClock> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion order, oldest first
    order: InsertionOrder,
    /// Running counters
    metrics: CacheMetrics,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL for entries stored without one
    default_ttl_ms: u64,
    clock: C,
}

impl<T> CacheStore<T, SystemClock> {
    // == Constructor ==
    /// Creates a new store on the system clock.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL for entries stored without an explicit one
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self::with_clock(max_size, default_ttl, SystemClock)
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size, config.default_ttl)
    }
}

impl<T, C: Clock> CacheStore<T, C> {
    /// Creates a new store reading time from `clock`.
    ///
    /// A zero capacity is raised to one and a zero TTL falls back to the
    /// five minute default, so the store is always usable.
    pub fn with_clock(max_size: usize, default_ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            metrics: CacheMetrics::new(),
            max_size: max_size.max(1),
            default_ttl_ms: duration_ms(default_ttl).unwrap_or(DEFAULT_TTL_MS),
            clock,
        }
    }

    // == Set ==
    /// Stores a payload with optional TTL.
    ///
    /// If the key already exists, the payload is overwritten, its TTL is reset
    /// and it becomes the newest insertion; nothing is evicted. Otherwise, if
    /// the cache is at capacity, the oldest insertion is evicted first.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `payload` - The payload to store
    /// * `ttl` - Optional TTL (uses the default if `None` or zero)
    pub fn set(&mut self, key: impl Into<String>, payload: T, ttl: Option<Duration>) {
        self.set_shared(key, Arc::new(payload), ttl);
    }

    /// Same as `set` for a payload the caller already shares.
    pub fn set_shared(&mut self, key: impl Into<String>, payload: Arc<T>, ttl: Option<Duration>) {
        let key = key.into();
        let ttl_ms = ttl.and_then(duration_ms).unwrap_or(self.default_ttl_ms);

        if let Some(previous) = self.entries.remove(&key) {
            self.order.remove(previous.seq);
        } else if self.entries.len() >= self.max_size {
            self.evict_oldest();
        }

        let seq = self.order.push(&key);
        let entry = CacheEntry::new(payload, self.clock.now_ms(), ttl_ms, seq);
        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Retrieves a payload by key.
    ///
    /// Returns `None` when the key is absent or expired. An expired entry is
    /// removed as part of the read. Reads never extend an entry's lifetime.
    pub fn get(&mut self, key: &str) -> Option<Arc<T>> {
        let now = self.clock.now_ms();
        let fresh = self.entries.get(key).map(|entry| !entry.is_expired_at(now));

        match fresh {
            Some(true) => {
                self.metrics.record_hit();
                self.entries.get(key).map(|entry| Arc::clone(&entry.payload))
            }
            Some(false) => {
                self.remove_entry(key);
                self.metrics.record_expirations(1);
                self.metrics.record_miss();
                debug!(key, "Dropped expired entry on read");
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    // == Has ==
    /// Returns true if `get` would return a payload.
    pub fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether something was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.metrics.record_invalidations(1);
        }
        removed
    }

    // == Invalidate ==
    /// Removes exactly one key. Same as `delete`.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.delete(key)
    }

    /// Removes every stored key that starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_by_prefix(&mut self, prefix: &str) -> usize {
        let matching: Vec<String> = self
            .order
            .keys()
            .filter(|key| key.starts_with(prefix))
            .map(str::to_string)
            .collect();

        let count = matching.len();
        for key in matching {
            self.remove_entry(&key);
        }

        if count > 0 {
            self.metrics.record_invalidations(count);
            debug!(prefix, count, "Invalidated entries by prefix");
        }
        count
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        self.metrics.record_invalidations(count);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.remove_entry(&key);
        }

        self.metrics.record_expirations(count);
        count
    }

    // == Stats ==
    /// Returns the current storage breakdown.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let expired = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count();

        CacheStats {
            total: self.entries.len(),
            valid: self.entries.len() - expired,
            expired,
            max_size: self.max_size,
        }
    }

    /// Returns the running counters.
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.clone()
    }

    /// Remaining lifetime of a fresh entry; `None` if absent or expired.
    ///
    /// Does not remove expired entries.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| Duration::from_millis(entry.ttl_remaining_ms(now)))
    }

    // == Keys ==
    /// Snapshot of every stored key, oldest insertion first.
    ///
    /// Includes expired entries that have not been removed yet.
    pub fn keys(&self) -> Vec<String> {
        self.order.keys().map(str::to_string).collect()
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    fn evict_oldest(&mut self) {
        if let Some(victim) = self.order.pop_oldest() {
            self.entries.remove(&victim);
            self.metrics.record_eviction();
            debug!(key = %victim, max_size = self.max_size, "Evicted oldest entry");
        }
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.order.remove(entry.seq);
                true
            }
            None => false,
        }
    }
}

/// Whole milliseconds of a positive duration; `None` for zero.
fn duration_ms(duration: Duration) -> Option<u64> {
    let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    (ms > 0).then_some(ms)
}
