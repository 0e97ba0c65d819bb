//! Configuration Module
//!
//! Construction-time options for the cache, loadable from caller-supplied
//! options or from environment variables.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default entry lifetime: 5 minutes
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
/// Default capacity
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default passive sweep interval: 1 minute
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 60 * 1000;

/// Caller-facing construction options.
///
/// Both fields are optional; a missing or zero value falls back to the
/// default, so `{}` is a valid options object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheOptions {
    /// Default entry lifetime in milliseconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Maximum number of stored entries
    #[serde(default)]
    pub max_size: Option<usize>,
}

/// Resolved cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime applied when `set` is called without a TTL
    pub default_ttl: Duration,
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// Interval between passive sweeps
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Resolves options against the defaults.
    pub fn from_options(options: &CacheOptions) -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: options
                .ttl
                .filter(|ttl| *ttl > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            max_size: options
                .max_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.max_size),
            cleanup_interval: defaults.cleanup_interval,
        }
    }

    /// Creates a new config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 60000)
    ///
    /// Unparsable or zero values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            default_ttl: Duration::from_millis(positive_env("CACHE_DEFAULT_TTL_MS", DEFAULT_TTL_MS)),
            max_size: positive_env("CACHE_MAX_SIZE", DEFAULT_MAX_SIZE),
            cleanup_interval: Duration::from_millis(positive_env(
                "CACHE_CLEANUP_INTERVAL_MS",
                DEFAULT_CLEANUP_INTERVAL_MS,
            )),
        }
    }

    /// Overrides the sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Checks that every field is usable.
    ///
    /// Configs built through `from_options`/`from_env` always pass; this
    /// guards hand-assembled ones.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_millis(DEFAULT_TTL_MS),
            max_size: DEFAULT_MAX_SIZE,
            cleanup_interval: Duration::from_millis(DEFAULT_CLEANUP_INTERVAL_MS),
        }
    }
}

fn positive_env<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
        .unwrap_or(default)
}
