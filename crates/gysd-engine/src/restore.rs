// ABOUTME: The restore engine: replays a snapshot's entity lists through the gYS API.
// ABOUTME: Per-record failures are skipped; the shared query cache is invalidated afterward.

use gysd_core::Resource;
use serde_json::Value;

use crate::manager::BackupManager;

impl BackupManager {
    /// Replay the snapshot with the given timestamp back through the API.
    ///
    /// The four replayable lists run concurrently; within a list, records are
    /// re-created one at a time and a failed record is logged and skipped
    /// without aborting its siblings. The company profile is captured for
    /// reference but never replayed. Returns false only when no snapshot with
    /// that timestamp exists, in which case no create call is issued; a true
    /// result means the replay ran to completion, not that every record
    /// succeeded.
    pub async fn restore(&self, timestamp: i64) -> bool {
        let Some(snapshot) = self.catalog.find(timestamp).await else {
            tracing::warn!("restore failed: no backup with timestamp {}", timestamp);
            return false;
        };

        tracing::info!(
            "restoring backup {} ({} records)",
            timestamp,
            snapshot.entities.total_records()
        );

        let replays = Resource::REPLAYABLE.iter().filter_map(|&resource| {
            snapshot
                .entities
                .collection(resource)
                .map(|records| self.replay(resource, records))
        });
        futures::future::join_all(replays).await;

        // Everything downstream of the cache is now stale.
        self.cache.invalidate_all().await;

        true
    }

    async fn replay(&self, resource: Resource, records: &[Value]) {
        for record in records {
            if let Err(err) = self.api.create(resource, record).await {
                tracing::warn!("skipping {} record during restore: {}", resource, err);
            }
        }
    }
}
