use crate::error::Result;
use crate::snapshot::{Snapshot, SnapshotBuilder};
use crate::source::SnapshotSource;
use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;

/// Holds the active [`Snapshot`] and replaces it wholesale on refresh.
///
/// Readers clone the `Arc` under a short read lock; a running fetch never
/// holds that lock, so validation passes are not blocked by network I/O.
pub struct SnapshotCache {
    source: Arc<dyn SnapshotSource>,
    active: RwLock<Arc<Snapshot>>,
    /// Serializes refreshes; holds the last issued generation.
    refresh_lock: Mutex<u64>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            active: RwLock::new(Arc::new(Snapshot::empty(""))),
            refresh_lock: Mutex::new(0),
        }
    }

    /// The currently active snapshot. Holders keep a consistent view even
    /// after a later refresh replaces it.
    pub fn active(&self) -> Arc<Snapshot> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch the facility and, only on success, make the result active.
    pub async fn refresh(&self, facility: &str) -> Result<Arc<Snapshot>> {
        let mut generation = self.refresh_lock.lock().await;
        let started = Instant::now();

        let data = match self.source.fetch(facility).await {
            Ok(data) => data,
            Err(err) => {
                log::warn!(
                    "Snapshot refresh for '{}' failed ({}); keeping generation {}",
                    facility,
                    err,
                    self.active().generation()
                );
                return Err(err);
            }
        };

        let next = *generation + 1;
        let snapshot = Arc::new(
            SnapshotBuilder::new()
                .generation(next)
                .fetched_at(Utc::now())
                .build(data),
        );

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        *generation = next;

        log::info!(
            "Snapshot generation {} active ({} ms)",
            next,
            started.elapsed().as_millis()
        );
        Ok(snapshot)
    }

    /// Age of the active snapshot, `None` before the first successful refresh.
    pub fn age(&self) -> Option<chrono::Duration> {
        self.active()
            .fetched_at()
            .map(|fetched_at| Utc::now() - fetched_at)
    }
}
