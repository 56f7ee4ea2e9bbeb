// ABOUTME: The BackupManager context object: collecting, persisting, and reporting status.
// ABOUTME: Owns the rate-limit bookkeeping and fans writes out to both backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use gysd_core::{Origin, Snapshot, Trigger};
use gysd_remote::{Collector, QueryCache, RemoteApi};
use gysd_store::{Catalog, DismissalKey, DocStore, SlotStore};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::GysdConfig;

/// The backup context object. Constructed once at startup from its injected
/// collaborators and shared via Arc; tests build isolated instances the same
/// way.
///
/// Protection here is best-effort, not transactional: the two backend writes
/// are independent, and nothing serializes overlapping persist or restore
/// calls; they interleave at I/O suspension points like any other pair of
/// timer callbacks.
pub struct BackupManager {
    pub(crate) api: Arc<dyn RemoteApi>,
    pub(crate) cache: Arc<QueryCache>,
    pub(crate) collector: Collector,
    pub(crate) slots: Arc<SlotStore>,
    pub(crate) docs: Arc<DocStore>,
    pub(crate) catalog: Catalog,
    pub(crate) dismissed: DismissalKey,
    pub(crate) interval: Duration,
    agent: String,
    source_url: String,
    last_backup_ms: AtomicI64,
    pub(crate) scheduler: Mutex<Option<JoinHandle<()>>>,
}

/// Point-in-time health summary for the CLI and for callers polling the daemon.
#[derive(Debug, Clone, Serialize)]
pub struct BackupStatus {
    pub has_backups: bool,
    pub newest_timestamp: i64,
    pub slot_count: usize,
    pub scheduler_active: bool,
}

impl BackupManager {
    pub fn new(
        config: &GysdConfig,
        api: Arc<dyn RemoteApi>,
        cache: Arc<QueryCache>,
        slots: Arc<SlotStore>,
        docs: Arc<DocStore>,
        dismissed: DismissalKey,
    ) -> Self {
        Self {
            collector: Collector::new(Arc::clone(&api), Arc::clone(&cache)),
            catalog: Catalog::new(Arc::clone(&slots), Arc::clone(&docs)),
            api,
            cache,
            slots,
            docs,
            dismissed,
            interval: config.interval,
            agent: config.agent.clone(),
            source_url: config.api_url.clone(),
            last_backup_ms: AtomicI64::new(0),
            scheduler: Mutex::new(None),
        }
    }

    /// Collect the current entity state and store a snapshot in both backends.
    ///
    /// Scheduled triggers within one interval of the last stored backup are a
    /// silent no-op returning false: nothing is collected or written. Manual
    /// and crash triggers always run. Storage failures are logged per backend
    /// and never fail the call, so the return value reports whether a backup
    /// was taken, not how many places it landed.
    pub async fn persist(&self, trigger: Trigger) -> bool {
        let now = Utc::now().timestamp_millis();

        if trigger == Trigger::Scheduled {
            let elapsed = now - self.last_backup_ms.load(Ordering::Acquire);
            if elapsed < self.interval.as_millis() as i64 {
                tracing::debug!(
                    "scheduled backup skipped, only {}ms since the last one",
                    elapsed
                );
                return false;
            }
        }

        let entities = self.collector.collect().await;
        let snapshot = Snapshot::new(
            now,
            entities,
            Origin {
                agent: self.agent.clone(),
                source_url: self.source_url.clone(),
                trigger,
            },
        );

        self.store_snapshot(&snapshot).await;
        self.last_backup_ms.store(snapshot.timestamp, Ordering::Release);

        tracing::info!(
            "stored {} backup {} ({} records)",
            trigger,
            snapshot.timestamp,
            snapshot.entities.total_records()
        );
        true
    }

    /// Write a snapshot to both backends. The writes are issued together and
    /// settle independently; a failure in one is logged and leaves the other
    /// untouched.
    pub(crate) async fn store_snapshot(&self, snapshot: &Snapshot) {
        let (slot_result, doc_result) =
            tokio::join!(async { self.slots.put(snapshot) }, self.docs.put(snapshot));

        if let Err(err) = slot_result {
            tracing::error!("slot store write failed: {}", err);
        }
        if let Err(err) = doc_result {
            tracing::error!("document store write failed: {}", err);
        }
    }

    /// The merged catalog: every known snapshot, newest first.
    pub async fn list(&self) -> Vec<Snapshot> {
        self.catalog.list().await
    }

    pub async fn status(&self) -> BackupStatus {
        let merged = self.catalog.list().await;
        BackupStatus {
            has_backups: !merged.is_empty(),
            newest_timestamp: merged.first().map(|s| s.timestamp).unwrap_or(0),
            slot_count: self.slots.count(),
            scheduler_active: self.scheduler_active().await,
        }
    }
}
