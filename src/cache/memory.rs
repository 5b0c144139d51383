//! In-Memory Backend
//!
//! Shares a [`CacheStore`] behind an async RwLock.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheError, CacheStats, CacheStore, PredictionCache};

/// Thread-safe handle to an in-process [`CacheStore`]. Clones share the store.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<CacheStore>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(max_entries))),
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn entry_count(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl PredictionCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<f64>, CacheError> {
        // Write lock: lookups update recency and counters
        Ok(self.store.write().await.get(key))
    }

    async fn put(&self, key: &str, value: f64, ttl_seconds: u64) -> Result<(), CacheError> {
        self.store.write().await.set(key, value, ttl_seconds);
        Ok(())
    }

    async fn stats(&self) -> Option<CacheStats> {
        Some(self.store.read().await.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_after_put() {
        let cache = MemoryCache::new(10);

        cache.put("2018 45000 Petrol", 550_000.0, 3600).await.unwrap();

        assert_eq!(
            cache.get("2018 45000 Petrol").await.unwrap(),
            Some(550_000.0)
        );
        assert_eq!(cache.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let cache = MemoryCache::new(10);
        let other = cache.clone();

        cache.put("k", 1.5, 3600).await.unwrap();

        assert_eq!(other.get("k").await.unwrap(), Some(1.5));
        assert_eq!(other.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_stats_reported() {
        let cache = MemoryCache::new(10);
        cache.put("k", 1.0, 3600).await.unwrap();
        cache.get("k").await.unwrap();
        cache.get("missing").await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new(10);
        cache.put("gone", 1.0, 0).await.unwrap();
        cache.put("kept", 2.0, 3600).await.unwrap();

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.entry_count().await, 1);
    }
}
