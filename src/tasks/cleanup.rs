//! Storage Sweep Task
//!
//! Background task that periodically asks the store whether its daily
//! expiration sweep is due, and runs it if so.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedStore;

/// Spawns a background task that calls [`LocalStore::auto_cleanup`] every
/// `check_interval`.
///
/// The sweep itself is still gated by the store's persisted last-cleanup time,
/// so a short check interval does not mean frequent sweeps.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = shared(LocalStore::in_memory());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
///
/// [`LocalStore::auto_cleanup`]: crate::storage::LocalStore::auto_cleanup
pub fn spawn_cleanup_task(store: SharedStore, check_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting storage sweep task, checking every {} seconds",
            check_interval.as_secs()
        );

        loop {
            tokio::time::sleep(check_interval).await;

            let removed = store.write().await.auto_cleanup();

            match removed {
                Some(n) => info!("Storage sweep: removed {} entries", n),
                None => debug!("Storage sweep: not due"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::shared;
    use crate::storage::{LocalStore, ManualClock, MemoryMedium, PutOptions, StoreOptions};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn open(clock: &ManualClock) -> SharedStore {
        shared(LocalStore::open(
            Box::new(MemoryMedium::default()),
            Arc::new(clock.clone()),
            StoreOptions::default(),
        ))
    }

    #[tokio::test]
    async fn test_cleanup_task_sweeps_when_due() {
        let clock = ManualClock::new(0);
        let store = open(&clock);
        store
            .write()
            .await
            .put("expire_soon", &1, PutOptions::ttl(Duration::from_secs(1)))
            .unwrap();

        clock.advance(DAY + Duration::from_secs(1));
        let handle = spawn_cleanup_task(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.read().await.raw("expire_soon").is_none());
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_waits_for_interval() {
        let clock = ManualClock::new(0);
        let store = open(&clock);
        store
            .write()
            .await
            .put("expired", &1, PutOptions::ttl(Duration::from_secs(1)))
            .unwrap();

        // Expired, but the daily sweep already ran at open
        clock.advance(Duration::from_secs(60));
        let handle = spawn_cleanup_task(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.read().await.raw("expired").is_some());
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let store = shared(LocalStore::in_memory());

        let handle = spawn_cleanup_task(store, Duration::from_secs(1));

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
