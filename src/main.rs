//! Car Price API - authenticated price prediction service
//!
//! Loads the model artifact once, connects the prediction cache and serves
//! the login/predict endpoints until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use car_price_api::cache::{MemoryCache, PredictionCache};
use car_price_api::config::CacheBackend;
use car_price_api::{create_router, spawn_cleanup_task, AppState, Config, ModelArtifact};

/// Main entry point for the prediction service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the model artifact
/// 4. Connect the cache backend (and start the TTL sweep for the memory backend)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_price_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Car Price API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: model_path={}, cache_backend={:?}, cache_ttl={}s, failure_policy={:?}, port={}",
        config.model_path,
        config.cache_backend,
        config.cache_ttl,
        config.cache_failure_policy,
        config.server_port
    );
    for warning in config.startup_warnings() {
        warn!("{}", warning);
    }

    let model = ModelArtifact::load(&config.model_path)
        .with_context(|| format!("loading model artifact from {}", config.model_path))?;

    let (cache, cleanup_handle) = connect_cache(&config).await?;

    let state = AppState::new(&config, Arc::new(model), cache);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the configured cache backend.
async fn connect_cache(
    config: &Config,
) -> anyhow::Result<(Arc<dyn PredictionCache>, Option<JoinHandle<()>>)> {
    match config.cache_backend {
        CacheBackend::Memory => {
            let cache = MemoryCache::new(config.cache_max_entries);
            let handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);
            info!(
                "In-memory prediction cache initialized (max_entries={})",
                config.cache_max_entries
            );
            Ok((Arc::new(cache), Some(handle)))
        }
        #[cfg(feature = "redis-cache")]
        CacheBackend::Redis => {
            let cache = car_price_api::cache::RedisCache::connect(&config.redis_url)
                .await
                .with_context(|| format!("connecting to {}", config.redis_url))?;
            Ok((Arc::new(cache), None))
        }
        #[cfg(not(feature = "redis-cache"))]
        CacheBackend::Redis => {
            anyhow::bail!("CACHE_BACKEND=redis requires building with the `redis-cache` feature")
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops background tasks.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
