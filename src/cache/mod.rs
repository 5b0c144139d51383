//! Cache Module
//!
//! Prediction cache keyed by feature fingerprint. The engine sees only the
//! [`PredictionCache`] trait; backends are the in-process [`MemoryCache`] and,
//! with the `redis-cache` feature, a networked [`RedisCache`].

mod entry;
mod lru;
mod memory;
#[cfg(feature = "redis-cache")]
mod redis_cache;
mod stats;
mod store;


use async_trait::async_trait;
use thiserror::Error;

// Re-export public types
pub use entry::CachedPrediction;
pub use memory::MemoryCache;
#[cfg(feature = "redis-cache")]
pub use redis_cache::RedisCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Default lifetime of a cached prediction in seconds
pub const DEFAULT_PREDICTION_TTL: u64 = 3600;

// == Cache Error ==
/// Failures of the cache backend itself. A miss is not an error.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backend could not be reached or rejected the command
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// Round-trip exceeded the configured bound
    #[error("cache operation timed out after {0} ms")]
    Timeout(u64),

    /// Stored bytes did not decode as a prediction
    #[error("corrupt cache value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

// == Prediction Cache ==
/// Key-value store of predictions with per-entry expiry.
#[async_trait]
pub trait PredictionCache: Send + Sync {
    /// Returns the live prediction for `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<f64>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry, expiring after `ttl_seconds`.
    async fn put(&self, key: &str, value: f64, ttl_seconds: u64) -> Result<(), CacheError>;

    /// Counters for backends that keep them.
    async fn stats(&self) -> Option<CacheStats> {
        None
    }
}

/// Serializes a prediction for byte-oriented backends.
///
/// Non-finite values are refused; JSON would silently store them as `null`.
pub fn encode_value(value: f64) -> Result<String, CacheError> {
    if !value.is_finite() {
        return Err(CacheError::Corrupt {
            key: String::new(),
            reason: format!("non-finite prediction {}", value),
        });
    }
    serde_json::to_string(&value).map_err(|err| CacheError::Corrupt {
        key: String::new(),
        reason: err.to_string(),
    })
}

/// Parses a stored prediction.
pub fn decode_value(key: &str, raw: &str) -> Result<f64, CacheError> {
    serde_json::from_str(raw).map_err(|err| CacheError::Corrupt {
        key: key.to_string(),
        reason: err.to_string(),
    })
}
