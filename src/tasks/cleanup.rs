//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.
//! Reads already refuse expired entries; this only reclaims memory held by
//! entries nobody reads again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{Clock, ResponseCache};

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for `interval` between passes and takes the cache lock
/// once per pass. It keeps only a weak reference to the store and exits on
/// the first pass after the last `ResponseCache` handle is dropped.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache: ResponseCache<Value> = ResponseCache::new(&config);
/// let sweeper = spawn_cleanup_task(&cache, config.cleanup_interval);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task<T, C>(cache: &ResponseCache<T, C>, interval: Duration) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    C: Clock,
{
    let store = cache.downgrade();

    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting cache cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(cache) = ResponseCache::upgrade(&store, interval) else {
                break;
            };
            let removed = cache.cleanup_expired();

            if removed > 0 {
                info!("Cache cleanup: removed {} expired entries", removed);
            } else {
                debug!("Cache cleanup: no expired entries found");
            }
        }

        info!("Cache dropped, cleanup task exiting");
    })
}
