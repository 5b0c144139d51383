//! Cached Prediction Module
//!
//! A single memoised prediction with its expiry deadline.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cached Prediction ==
/// A prediction stored under its feature fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPrediction {
    /// The memoised price estimate
    pub value: f64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CachedPrediction {
    // == Constructor ==
    /// Creates an entry that expires `ttl_seconds` from now.
    pub fn new(value: f64, ttl_seconds: u64) -> Self {
        Self {
            value,
            expires_at: current_timestamp_ms().saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    ///
    /// A zero TTL therefore produces an entry that is never observable.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
