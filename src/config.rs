//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::Algorithm;
use tracing::warn;

use crate::auth::DEFAULT_TOKEN_TTL_MINUTES;
use crate::cache::DEFAULT_PREDICTION_TTL;
use crate::engine::DEFAULT_CACHE_TIMEOUT;

/// Default signing secret used when `JWT_SECRET_KEY` is unset. Development only.
const DEV_SECRET_KEY: &str = "change-me-in-production";

/// Default API key used when `API_KEY` is unset. Development only.
const DEV_API_KEY: &str = "dev-api-key";

/// Default password of the fixed identity. Development only.
const DEV_PASSWORD: &str = "admin";

// == Cache Backend ==
/// Which key-value store backs the prediction cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// In-process store with TTL sweep and LRU bound
    Memory,
    /// Networked Redis instance at `redis_url`
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

// == Cache Failure Policy ==
/// What the prediction path does when the cache backend errors or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFailurePolicy {
    /// Treat a failed read as a miss and a failed write as a no-op
    Bypass,
    /// Fail the prediction request
    FailClosed,
}

impl FromStr for CacheFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bypass" => Ok(CacheFailurePolicy::Bypass),
            "fail" | "fail_closed" => Ok(CacheFailurePolicy::FailClosed),
            other => Err(format!("unknown cache failure policy '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HMAC secret used to sign session tokens
    pub jwt_secret_key: String,
    /// Token signing algorithm
    pub jwt_algorithm: Algorithm,
    /// Lifetime of issued tokens in minutes
    pub access_token_ttl_minutes: i64,
    /// Shared API key expected in the `api-key` header
    pub api_key: String,
    /// Username of the single fixed identity
    pub auth_username: String,
    /// Password of the single fixed identity
    pub auth_password: String,
    /// Location of the serialized model artifact
    pub model_path: String,
    /// Cache backend selection
    pub cache_backend: CacheBackend,
    /// Redis connection URL, used when `cache_backend` is `Redis`
    pub redis_url: String,
    /// TTL in seconds for cached predictions
    pub cache_ttl: u64,
    /// Capacity of the in-memory cache backend
    pub cache_max_entries: usize,
    /// Upper bound on a single cache round-trip in milliseconds
    pub cache_timeout_ms: u64,
    /// Behaviour when the cache backend is unavailable
    pub cache_failure_policy: CacheFailurePolicy,
    /// Background TTL sweep interval in seconds (memory backend only)
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

/// Reads and parses an environment variable, returning `None` when unset or unparseable.
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `JWT_SECRET_KEY` - Token signing secret (default: development secret)
    /// - `JWT_ALGORITHM` - HS256, HS384 or HS512 (default: HS256)
    /// - `ACCESS_TOKEN_TTL_MINUTES` - Token lifetime (default: 30)
    /// - `API_KEY` - Shared API key (default: development key)
    /// - `AUTH_USERNAME` / `AUTH_PASSWORD` - Fixed identity (default: admin/admin)
    /// - `MODEL_PATH` - Model artifact path (default: artifacts/car_price_model.json)
    /// - `CACHE_BACKEND` - memory or redis (default: memory)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `CACHE_TTL` - Prediction TTL in seconds (default: 3600)
    /// - `CACHE_MAX_ENTRIES` - Memory backend capacity (default: 10000)
    /// - `CACHE_TIMEOUT_MS` - Cache round-trip timeout (default: 250)
    /// - `CACHE_FAILURE_POLICY` - bypass or fail (default: bypass)
    /// - `CLEANUP_INTERVAL` - TTL sweep frequency in seconds (default: 1)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret_key: env::var("JWT_SECRET_KEY").unwrap_or(defaults.jwt_secret_key),
            jwt_algorithm: resolve_algorithm(
                env::var("JWT_ALGORITHM").ok().as_deref(),
                defaults.jwt_algorithm,
            ),
            access_token_ttl_minutes: env_parse("ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or(defaults.access_token_ttl_minutes),
            api_key: env::var("API_KEY").unwrap_or(defaults.api_key),
            auth_username: env::var("AUTH_USERNAME").unwrap_or(defaults.auth_username),
            auth_password: env::var("AUTH_PASSWORD").unwrap_or(defaults.auth_password),
            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            cache_backend: env_parse("CACHE_BACKEND").unwrap_or(defaults.cache_backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_ttl: env_parse("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries),
            cache_timeout_ms: env_parse("CACHE_TIMEOUT_MS").unwrap_or(defaults.cache_timeout_ms),
            cache_failure_policy: env_parse("CACHE_FAILURE_POLICY")
                .unwrap_or(defaults.cache_failure_policy),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Lists settings that are unsafe to run with outside development.
    pub fn startup_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.jwt_secret_key == DEV_SECRET_KEY {
            warnings.push("JWT_SECRET_KEY is unset; tokens are signed with the public development secret");
        }
        if self.api_key == DEV_API_KEY {
            warnings.push("API_KEY is unset; the public development API key is accepted");
        }
        if self.auth_password == DEV_PASSWORD {
            warnings.push("AUTH_PASSWORD is the development default");
        }
        if self.access_token_ttl_minutes <= 0 {
            warnings.push("ACCESS_TOKEN_TTL_MINUTES is not positive; issued tokens are already expired");
        } else if Duration::try_minutes(self.access_token_ttl_minutes)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .is_none()
        {
            warnings.push("ACCESS_TOKEN_TTL_MINUTES is out of range; every login will fail");
        }
        warnings
    }
}

/// Tokens are signed with a shared secret, so only the HMAC family applies.
fn is_hmac(alg: &Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Parses `JWT_ALGORITHM`, warning when an unusable value is replaced by `default`.
fn resolve_algorithm(raw: Option<&str>, default: Algorithm) -> Algorithm {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<Algorithm>() {
        Ok(alg) if is_hmac(&alg) => alg,
        _ => {
            warn!(value = %raw, fallback = ?default, "JWT_ALGORITHM is not an HMAC algorithm, ignoring");
            default
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jwt_secret_key: DEV_SECRET_KEY.to_string(),
            jwt_algorithm: Algorithm::HS256,
            access_token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            api_key: DEV_API_KEY.to_string(),
            auth_username: "admin".to_string(),
            auth_password: DEV_PASSWORD.to_string(),
            model_path: "artifacts/car_price_model.json".to_string(),
            cache_backend: CacheBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_ttl: DEFAULT_PREDICTION_TTL,
            cache_max_entries: 10_000,
            cache_timeout_ms: DEFAULT_CACHE_TIMEOUT.as_millis() as u64,
            cache_failure_policy: CacheFailurePolicy::Bypass,
            cleanup_interval: 1,
            server_port: 8000,
        }
    }
}
