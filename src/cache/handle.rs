//! Shared Cache Handle
//!
//! `ResponseCache` is the handle the host builds once at start-up and hands
//! to every consumer. Clones share one store; a single mutex guards each full
//! read/modify/evict sequence.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::cache::{CacheMetrics, CacheStats, CacheStore, Clock, SystemClock};
use crate::config::{CacheConfig, DEFAULT_CLEANUP_INTERVAL_MS};
use crate::tasks::spawn_cleanup_task;

type SharedStore<T, C> = Arc<Mutex<CacheStore<T, C>>>;

/// Cloneable, thread-safe handle over a `CacheStore`.
///
/// Every operation takes the lock once and never awaits while holding it.
pub struct ResponseCache<T, C = SystemClock> {
    inner: SharedStore<T, C>,
    /// Interval used by `start_sweeper`
    cleanup_interval: Duration,
}

impl<T, C> Clone for ResponseCache<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cleanup_interval: self.cleanup_interval,
        }
    }
}

impl<T> ResponseCache<T, SystemClock> {
    /// Creates a cache on the system clock.
    pub fn new(config: &CacheConfig) -> Self {
        Self::from_store(CacheStore::from_config(config))
            .with_cleanup_interval(config.cleanup_interval)
    }
}

impl<T> Default for ResponseCache<T, SystemClock> {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl<T, C: Clock> ResponseCache<T, C> {
    /// Creates a cache reading time from `clock`.
    pub fn with_clock(config: &CacheConfig, clock: C) -> Self {
        Self::from_store(CacheStore::with_clock(
            config.max_size,
            config.default_ttl,
            clock,
        ))
        .with_cleanup_interval(config.cleanup_interval)
    }

    /// Wraps an existing store; the sweep interval is the one-minute default.
    pub fn from_store(store: CacheStore<T, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
            cleanup_interval: Duration::from_millis(DEFAULT_CLEANUP_INTERVAL_MS),
        }
    }

    /// Overrides the interval `start_sweeper` uses. A zero interval keeps
    /// the current one.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.cleanup_interval = interval;
        }
        self
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore<T, C>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Cache mutex was poisoned, recovering store");
            poisoned.into_inner()
        })
    }

    /// Stores `payload` under `key`. See `CacheStore::set`.
    pub fn set(&self, key: impl Into<String>, payload: T, ttl: Option<Duration>) {
        self.lock().set(key, payload, ttl);
    }

    /// Returns a read-only snapshot of a fresh payload.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.lock().get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.lock().has(key)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.lock().delete(key)
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().invalidate(key)
    }

    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        self.lock().invalidate_by_prefix(prefix)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Stored entry count, expired-but-unswept entries included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.lock().metrics()
    }

    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.lock().ttl_remaining(key)
    }

    /// Runs one passive sweep. Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        self.lock().cleanup_expired()
    }

    // == Read Through ==
    /// Returns the cached payload for `key`, or fetches, stores and returns a
    /// fresh one.
    ///
    /// The lock is released while `fetch` runs, so other callers (and the
    /// sweeper) may touch the cache in the meantime; the fresh payload simply
    /// overwrites whatever is there. A failed fetch caches nothing.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let payload = Arc::new(fetch().await?);
        self.lock().set_shared(key, Arc::clone(&payload), ttl);
        Ok(payload)
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<CacheStore<T, C>>> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(
        weak: &Weak<Mutex<CacheStore<T, C>>>,
        cleanup_interval: Duration,
    ) -> Option<Self> {
        weak.upgrade().map(|inner| Self {
            inner,
            cleanup_interval,
        })
    }
}

impl<T, C> ResponseCache<T, C>
where
    T: Send + Sync + 'static,
    C: Clock,
{
    /// Starts the passive sweep on the current tokio runtime.
    ///
    /// The task only holds a weak reference: it ends by itself once every
    /// handle is dropped, or when the returned handle is aborted.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        spawn_cleanup_task(self, interval)
    }

    /// Starts the passive sweep at the configured `cleanup_interval`.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        spawn_cleanup_task(self, self.cleanup_interval)
    }
}
