//! Redis Backend
//!
//! Networked prediction cache using `GET` and `SETEX` over a multiplexed connection.

use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands,
};
use tracing::info;

use crate::cache::{decode_value, encode_value, CacheError, PredictionCache};

/// Reconnect attempts before startup gives up on the backend.
const CONNECT_RETRIES: usize = 2;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

fn unavailable(err: redis::RedisError) -> CacheError {
    CacheError::Unavailable(err.to_string())
}

/// Decodes the reply to `GET key`; an absent key is a miss.
fn decode_reply(key: &str, raw: Option<String>) -> Result<Option<f64>, CacheError> {
    raw.map(|raw| decode_value(key, &raw)).transpose()
}

/// Payload to `SETEX`, or `None` when the entry would never be observable.
fn setex_payload(value: f64, ttl_seconds: u64) -> Result<Option<String>, CacheError> {
    // SETEX rejects a zero expiry
    if ttl_seconds == 0 {
        return Ok(None);
    }
    encode_value(value).map(Some)
}

/// Redis-backed cache. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects to `url`, e.g. `redis://127.0.0.1:6379`.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(CONNECT_RETRIES)
            .set_connection_timeout(CONNECT_TIMEOUT);
        let conn = ConnectionManager::new_with_config(client, config)
            .await
            .map_err(unavailable)?;
        info!("Connected to Redis prediction cache");
        Ok(Self { conn })
    }
}

#[async_trait]
impl PredictionCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<f64>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(unavailable)?;
        decode_reply(key, raw)
    }

    async fn put(&self, key: &str, value: f64, ttl_seconds: u64) -> Result<(), CacheError> {
        let Some(payload) = setex_payload(value, ttl_seconds)? else {
            return Ok(());
        };
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, payload, ttl_seconds)
            .await
            .map_err(unavailable)
    }
}
