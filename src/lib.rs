//! Response Cache - an in-process cache for API responses
//!
//! Provides per-entry TTL expiration, a hard capacity with FIFO eviction,
//! and prefix invalidation for keeping cached lists coherent after writes.

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod tasks;
pub mod utils;

pub use cache::{CacheStats, ManualClock, ResponseCache};
pub use config::{CacheConfig, CacheOptions};
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
pub use utils::ApiCacheUtils;
