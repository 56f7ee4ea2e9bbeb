// ABOUTME: Last-known-good query cache shared between the collector and restore engine.
// ABOUTME: Holds the most recent successful fetch per resource; restore clears it wholesale.

use std::collections::HashMap;

use gysd_core::Resource;
use serde_json::Value;
use tokio::sync::RwLock;

/// The shared query cache. The collector refreshes an entry on every
/// successful fetch and falls back to it when the API is unreachable, so a
/// flaky network degrades a snapshot to stale data instead of holes. After a
/// restore the whole cache is invalidated so consumers re-fetch fresh state.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<Resource, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest successful response for a resource.
    pub async fn put(&self, resource: Resource, value: Value) {
        self.entries.write().await.insert(resource, value);
    }

    /// The last cached response for a resource, if any.
    pub async fn get(&self, resource: Resource) -> Option<Value> {
        self.entries.read().await.get(&resource).cloned()
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
