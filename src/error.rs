//! Error types for the response cache
//!
//! Cache operations themselves are total: a miss is `None`, deleting an
//! absent key is a no-op. Errors only come from the layers around the store,
//! namely key/payload encoding and configuration.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A filter set or payload could not be encoded, or a stored payload
    /// could not be decoded into the requested type
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Key parameters did not have a usable shape
    #[error("Invalid key parameters: {0}")]
    InvalidKey(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
