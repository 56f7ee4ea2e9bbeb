// ABOUTME: The merged catalog: a deduplicated, newest-first view across both backends.
// ABOUTME: Pure reads; each backend degrades to an empty contribution on failure.

use std::collections::HashSet;
use std::sync::Arc;

use gysd_core::Snapshot;

use crate::doc::DocStore;
use crate::slot::SlotStore;

/// The union view over the slot store and the document store. A snapshot that
/// made it into only one backend (a crash between the two writes, a quota
/// refusal) still shows up here; when both hold a timestamp, the slot store's
/// copy wins.
pub struct Catalog {
    slots: Arc<SlotStore>,
    docs: Arc<DocStore>,
}

impl Catalog {
    pub fn new(slots: Arc<SlotStore>, docs: Arc<DocStore>) -> Self {
        Self { slots, docs }
    }

    /// All known snapshots, deduplicated by timestamp, newest first.
    pub async fn list(&self) -> Vec<Snapshot> {
        let from_slots = match self.slots.list() {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("slot store read failed ({}), omitting from catalog", err);
                Vec::new()
            }
        };

        let from_docs = match self.docs.list().await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(
                    "document store read failed ({}), omitting from catalog",
                    err
                );
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        let mut merged: Vec<Snapshot> = from_slots
            .into_iter()
            .chain(from_docs)
            .filter(|snapshot| seen.insert(snapshot.timestamp))
            .collect();
        merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        merged
    }

    /// Look up a snapshot by timestamp in the merged view.
    pub async fn find(&self, timestamp: i64) -> Option<Snapshot> {
        self.list()
            .await
            .into_iter()
            .find(|snapshot| snapshot.timestamp == timestamp)
    }
}
