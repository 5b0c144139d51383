//! Prediction Engine
//!
//! Cache-aside inference: look the payload's fingerprint up in the cache, and
//! on a miss run the model and write the estimate back. The cache is only a
//! memo; the model is the source of truth.

mod key;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheError, PredictionCache, DEFAULT_PREDICTION_TTL};
use crate::config::{CacheFailurePolicy, Config};
use crate::error::{ApiError, Result};
use crate::ml::PriceModel;

pub use crate::ml::FeaturePayload;
pub use key::cache_key;

/// Default bound on a single cache round-trip.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

// == Prediction ==
/// Where an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    Cache,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub source: PredictionSource,
}

// == Prediction Engine ==
pub struct PredictionEngine {
    model: Arc<dyn PriceModel>,
    cache: Arc<dyn PredictionCache>,
    ttl_seconds: u64,
    cache_timeout: Duration,
    failure_policy: CacheFailurePolicy,
}

impl PredictionEngine {
    // == Constructor ==
    /// Creates an engine with the default TTL, timeout and bypass policy.
    pub fn new(model: Arc<dyn PriceModel>, cache: Arc<dyn PredictionCache>) -> Self {
        Self {
            model,
            cache,
            ttl_seconds: DEFAULT_PREDICTION_TTL,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            failure_policy: CacheFailurePolicy::Bypass,
        }
    }

    /// Creates an engine using the cache settings from configuration.
    pub fn from_config(
        config: &Config,
        model: Arc<dyn PriceModel>,
        cache: Arc<dyn PredictionCache>,
    ) -> Self {
        Self::new(model, cache)
            .with_ttl(config.cache_ttl)
            .with_cache_timeout(Duration::from_millis(config.cache_timeout_ms))
            .with_failure_policy(config.cache_failure_policy)
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    pub fn with_failure_policy(mut self, policy: CacheFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    // == Predict ==
    /// Returns the price estimate for `features`, serving from cache when possible.
    pub async fn predict(&self, features: &FeaturePayload) -> Result<Prediction> {
        let key = cache_key(features);

        if let Some(value) = self.lookup(&key).await? {
            debug!(key = %key, "prediction cache hit");
            return Ok(Prediction {
                value,
                source: PredictionSource::Cache,
            });
        }

        debug!(key = %key, "prediction cache miss, running inference");
        let value = self.model.predict(features)?;
        if !value.is_finite() {
            return Err(ApiError::Internal(format!(
                "model produced non-finite estimate {}",
                value
            )));
        }

        self.store(&key, value).await?;

        Ok(Prediction {
            value,
            source: PredictionSource::Model,
        })
    }

    async fn lookup(&self, key: &str) -> Result<Option<f64>> {
        let outcome = tokio::time::timeout(self.cache_timeout, self.cache.get(key))
            .await
            .unwrap_or_else(|_| Err(self.timeout_error()));

        match outcome {
            Ok(value) => Ok(value),
            Err(err) => self.degrade(err, "read").map(|_| None),
        }
    }

    async fn store(&self, key: &str, value: f64) -> Result<()> {
        let outcome = tokio::time::timeout(
            self.cache_timeout,
            self.cache.put(key, value, self.ttl_seconds),
        )
        .await
        .unwrap_or_else(|_| Err(self.timeout_error()));

        match outcome {
            Ok(()) => Ok(()),
            Err(err) => self.degrade(err, "write"),
        }
    }

    fn timeout_error(&self) -> CacheError {
        CacheError::Timeout(self.cache_timeout.as_millis() as u64)
    }

    /// Applies the failure policy to a cache fault.
    fn degrade(&self, err: CacheError, operation: &str) -> Result<()> {
        match self.failure_policy {
            CacheFailurePolicy::Bypass => {
                warn!(error = %err, operation, "prediction cache degraded, bypassing");
                Ok(())
            }
            CacheFailurePolicy::FailClosed => Err(ApiError::CacheUnavailable(err)),
        }
    }
}

impl std::fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("cache_timeout", &self.cache_timeout)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::ml::ModelError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Price = year * 100 + km_driven, counting every call.
    #[derive(Default)]
    struct CountingModel {
        calls: AtomicUsize,
    }

    impl PriceModel for CountingModel {
        fn predict(&self, features: &FeaturePayload) -> std::result::Result<f64, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let year = features.get("year").and_then(|v| v.as_f64()).ok_or_else(|| {
                ModelError::InvalidFeature {
                    name: "year".to_string(),
                    reason: "missing".to_string(),
                }
            })?;
            let km = features.get("km_driven").and_then(|v| v.as_f64()).unwrap_or(0.0);
            Ok(year * 100.0 + km)
        }
    }

    struct DownCache;

    #[async_trait]
    impl PredictionCache for DownCache {
        async fn get(&self, _key: &str) -> std::result::Result<Option<f64>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn put(&self, _: &str, _: f64, _: u64) -> std::result::Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    struct StalledCache;

    #[async_trait]
    impl PredictionCache for StalledCache {
        async fn get(&self, _key: &str) -> std::result::Result<Option<f64>, CacheError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn put(&self, _: &str, _: f64, _: u64) -> std::result::Result<(), CacheError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn car() -> FeaturePayload {
        json!({"year": 2018, "km_driven": 45000, "fuel": "Petrol"})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let model = Arc::new(CountingModel::default());
        let engine = PredictionEngine::new(model.clone(), Arc::new(MemoryCache::new(10)));

        let first = engine.predict(&car()).await.unwrap();
        let second = engine.predict(&car()).await.unwrap();

        assert_eq!(first.source, PredictionSource::Model);
        assert_eq!(second.source, PredictionSource::Cache);
        assert_eq!(first.value, second.value);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_written_under_payload_key() {
        let cache = Arc::new(MemoryCache::new(10));
        let engine = PredictionEngine::new(Arc::new(CountingModel::default()), cache.clone());

        let prediction = engine.predict(&car()).await.unwrap();

        assert_eq!(
            cache.get("2018 45000 Petrol").await.unwrap(),
            Some(prediction.value)
        );
    }

    #[tokio::test]
    async fn test_hit_does_not_write() {
        let cache = Arc::new(MemoryCache::new(10));
        cache.put("2018 45000 Petrol", 1.0, 3600).await.unwrap();
        let engine = PredictionEngine::new(Arc::new(CountingModel::default()), cache.clone());

        let prediction = engine.predict(&car()).await.unwrap();

        assert_eq!(prediction.value, 1.0);
        assert_eq!(cache.stats().await.unwrap().writes, 1);
    }

    #[tokio::test]
    async fn test_reordered_payload_misses() {
        let model = Arc::new(CountingModel::default());
        let engine = PredictionEngine::new(model.clone(), Arc::new(MemoryCache::new(10)));
        let reordered = json!({"fuel": "Petrol", "km_driven": 45000, "year": 2018})
            .as_object()
            .cloned()
            .unwrap();

        let a = engine.predict(&car()).await.unwrap();
        let b = engine.predict(&reordered).await.unwrap();

        assert_eq!(a.value, b.value);
        assert_eq!(b.source, PredictionSource::Model);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_inference_error_not_cached() {
        let cache = Arc::new(MemoryCache::new(10));
        let engine = PredictionEngine::new(Arc::new(CountingModel::default()), cache.clone());
        let bad = json!({"fuel": "Petrol"}).as_object().cloned().unwrap();

        let err = engine.predict(&bad).await.unwrap_err();

        assert!(matches!(err, ApiError::Inference(_)));
        assert_eq!(cache.stats().await.unwrap().writes, 0);
    }

    #[tokio::test]
    async fn test_bypass_policy_falls_through_to_model() {
        let model = Arc::new(CountingModel::default());
        let engine = PredictionEngine::new(model.clone(), Arc::new(DownCache));

        let first = engine.predict(&car()).await.unwrap();
        let second = engine.predict(&car()).await.unwrap();

        assert_eq!(first.value, 2018.0 * 100.0 + 45000.0);
        assert_eq!(second.source, PredictionSource::Model);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fail_closed_policy_surfaces_error() {
        let model = Arc::new(CountingModel::default());
        let engine = PredictionEngine::new(model.clone(), Arc::new(DownCache))
            .with_failure_policy(CacheFailurePolicy::FailClosed);

        let err = engine.predict(&car()).await.unwrap_err();

        assert!(matches!(
            err,
            ApiError::CacheUnavailable(CacheError::Unavailable(_))
        ));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stalled_cache_times_out() {
        let engine = PredictionEngine::new(Arc::new(CountingModel::default()), Arc::new(StalledCache))
            .with_cache_timeout(Duration::from_millis(50));

        let prediction = engine.predict(&car()).await.unwrap();
        assert_eq!(prediction.source, PredictionSource::Model);

        let strict = PredictionEngine::new(Arc::new(CountingModel::default()), Arc::new(StalledCache))
            .with_cache_timeout(Duration::from_millis(50))
            .with_failure_policy(CacheFailurePolicy::FailClosed);
        let err = strict.predict(&car()).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::CacheUnavailable(CacheError::Timeout(50))
        ));
    }
}
