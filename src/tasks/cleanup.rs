//! TTL Cleanup Task
//!
//! Background task that periodically removes expired predictions from the
//! in-memory cache backend. Networked backends expire entries themselves.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns a background task that purges expired entries every `cleanup_interval_secs`.
///
/// Returns the JoinHandle so the task can be aborted during graceful shutdown.
/// An interval of zero is treated as one second.
pub fn spawn_cleanup_task(cache: MemoryCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting prediction cache cleanup task with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Cache cleanup: removed {} expired predictions", removed);
            } else {
                debug!("Cache cleanup: no expired predictions found");
            }
        }
    })
}
