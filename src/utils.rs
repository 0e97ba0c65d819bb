//! Resource Cache Helpers
//!
//! Thin wrappers that pick the key shape and TTL for each kind of API
//! response, plus the invalidation fan-out mutation handlers call after a
//! successful write. Payloads are stored as JSON values and decoded on read.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheStats, Clock, ResponseCache, SystemClock};
use crate::error::Result;
use crate::keys;

// == TTL Policy ==
/// Paginated, filtered lists change often
pub const POSTS_TTL: Duration = Duration::from_secs(2 * 60);
pub const POST_TTL: Duration = Duration::from_secs(5 * 60);
/// Near-static reference data
pub const CATEGORIES_TTL: Duration = Duration::from_secs(30 * 60);
pub const POPULAR_TAGS_TTL: Duration = Duration::from_secs(30 * 60);
pub const USER_PROFILE_TTL: Duration = Duration::from_secs(10 * 60);

/// Resource-specific view over a shared `ResponseCache`.
///
/// Getters return `Ok(None)` on a miss and `Err(CacheError::Codec)` when the
/// stored payload does not decode into the requested type.
pub struct ApiCacheUtils<C = SystemClock> {
    cache: ResponseCache<Value, C>,
}

impl<C> Clone for ApiCacheUtils<C> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<C: Clock> ApiCacheUtils<C> {
    pub fn new(cache: ResponseCache<Value, C>) -> Self {
        Self { cache }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &ResponseCache<Value, C> {
        &self.cache
    }

    // == Posts List ==
    pub fn set_posts<F, P>(&self, page: u32, filters: &F, data: &P) -> Result<()>
    where
        F: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        self.store(keys::posts_key(page, filters)?, data, POSTS_TTL)
    }

    pub fn posts<F, P>(&self, page: u32, filters: &F) -> Result<Option<P>>
    where
        F: Serialize + ?Sized,
        P: DeserializeOwned,
    {
        self.load(&keys::posts_key(page, filters)?)
    }

    // == Single Post ==
    pub fn set_post<P: Serialize + ?Sized>(&self, id: u64, data: &P) -> Result<()> {
        self.store(keys::post_key(id), data, POST_TTL)
    }

    pub fn post<P: DeserializeOwned>(&self, id: u64) -> Result<Option<P>> {
        self.load(&keys::post_key(id))
    }

    // == Reference Data ==
    pub fn set_categories<P: Serialize + ?Sized>(&self, data: &P) -> Result<()> {
        self.store(keys::CATEGORIES.to_string(), data, CATEGORIES_TTL)
    }

    pub fn categories<P: DeserializeOwned>(&self) -> Result<Option<P>> {
        self.load(keys::CATEGORIES)
    }

    pub fn set_popular_tags<P: Serialize + ?Sized>(&self, data: &P) -> Result<()> {
        self.store(keys::POPULAR_TAGS.to_string(), data, POPULAR_TAGS_TTL)
    }

    pub fn popular_tags<P: DeserializeOwned>(&self) -> Result<Option<P>> {
        self.load(keys::POPULAR_TAGS)
    }

    // == User Profile ==
    pub fn set_user_profile<P: Serialize + ?Sized>(&self, id: u64, data: &P) -> Result<()> {
        self.store(keys::user_profile_key(id), data, USER_PROFILE_TTL)
    }

    pub fn user_profile<P: DeserializeOwned>(&self, id: u64) -> Result<Option<P>> {
        self.load(&keys::user_profile_key(id))
    }

    // == Invalidation ==
    /// Drops every cached posts-list page, whatever its page or filters.
    ///
    /// Called when the set of posts changes: cached pages may now be shifted
    /// or carry stale counts.
    pub fn invalidate_posts(&self) -> usize {
        self.cache.invalidate_by_prefix(keys::POSTS_PREFIX)
    }

    /// Drops one post and every posts-list page, since any page may hold it.
    ///
    /// Returns the total number of entries removed.
    pub fn invalidate_post(&self, id: u64) -> usize {
        let single = usize::from(self.cache.invalidate(&keys::post_key(id)));
        let pages = self.invalidate_posts();
        debug!(post_id = id, pages, "Invalidated post");
        single + pages
    }

    pub fn invalidate_user_profile(&self, id: u64) -> bool {
        self.cache.invalidate(&keys::user_profile_key(id))
    }

    /// Drops everything, e.g. on logout.
    pub fn clear_all(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn store<P: Serialize + ?Sized>(&self, key: String, data: &P, ttl: Duration) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.cache.set(key, value, Some(ttl));
        Ok(())
    }

    fn load<P: DeserializeOwned>(&self, key: &str) -> Result<Option<P>> {
        match self.cache.get(key) {
            Some(value) => Ok(Some(P::deserialize(&*value)?)),
            None => Ok(None),
        }
    }
}
