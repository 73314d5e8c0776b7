//! Expiry Reaper Task
//!
//! Background task that periodically reclaims expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::error::CacheError;

/// Spawns a background task that periodically expunges expired entries.
///
/// The sweep goes through the dispatcher like any other action, so it never
/// races the consumer for the cache. A tick that finds the queue full is
/// skipped; the task ends on its own once the dispatcher has shut down.
///
/// # Example
/// ```ignore
/// let (dispatcher, _consumer) = Dispatcher::spawn(CacheStore::new(1000)?, 50)?;
/// let reaper = spawn_reaper_task(dispatcher.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// reaper.abort();
/// ```
pub fn spawn_reaper_task(dispatcher: Dispatcher, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting expiry reaper");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match dispatcher.expunge().await {
                Ok(0) => debug!("expiry reaper: no expired entries found"),
                Ok(removed) => info!("expiry reaper: removed {} expired entries", removed),
                Err(CacheError::QueueFull) => {
                    debug!("expiry reaper: action queue full, skipping sweep")
                }
                Err(err) => {
                    info!("expiry reaper stopping: {}", err);
                    break;
                }
            }
        }
    })
}
