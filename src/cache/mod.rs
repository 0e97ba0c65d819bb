//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and FIFO eviction.

mod clock;
mod entry;
mod fifo;
mod handle;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use fifo::InsertionOrder;
pub use handle::ResponseCache;
pub use stats::{CacheMetrics, CacheStats};
pub use store::CacheStore;
