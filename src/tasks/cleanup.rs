//! Expiration Sweep Task
//!
//! Background task that periodically drops expired entries from a
//! [`MemoryStore`], so stale memoized values do not wait for a lookup to be
//! reclaimed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for `cleanup_interval_secs`
/// between sweeps. It holds the store's lock only for the sweep itself.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop sweeping.
///
/// # Example
/// ```ignore
/// let manager = CacheManager::instance();
/// let sweeper = spawn_cleanup_task(manager.store().clone(), 60);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "Starting expiration sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired();
            if removed > 0 {
                info!(removed, "Expiration sweep dropped expired entries");
            } else {
                debug!("Expiration sweep found nothing to drop");
            }
        }
    })
}
