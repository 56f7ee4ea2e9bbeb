// ABOUTME: Gathers the current state of all gYS entities into one EntitySet.
// ABOUTME: Fetches the five resources concurrently, falling back to cached data per resource.

use std::sync::Arc;

use gysd_core::{EntitySet, Resource};
use serde_json::Value;

use crate::api::RemoteApi;
use crate::cache::QueryCache;

/// Collects a full entity capture from the remote API. Every per-resource
/// failure is absorbed locally: the cached value (or an empty list / absent
/// company) stands in, so `collect` always produces a complete EntitySet and
/// never fails. Callers cannot tell fresh data from fallback data; the
/// capture is best-effort by design.
pub struct Collector {
    api: Arc<dyn RemoteApi>,
    cache: Arc<QueryCache>,
}

impl Collector {
    pub fn new(api: Arc<dyn RemoteApi>, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    /// Capture all five resources concurrently.
    pub async fn collect(&self) -> EntitySet {
        let (products, clients, sales, categories, company) = tokio::join!(
            self.collection(Resource::Products),
            self.collection(Resource::Clients),
            self.collection(Resource::Sales),
            self.collection(Resource::Categories),
            self.company(),
        );

        EntitySet {
            products,
            clients,
            sales,
            categories,
            company,
        }
    }

    async fn collection(&self, resource: Resource) -> Vec<Value> {
        match self.api.fetch(resource).await {
            Ok(value) => {
                self.cache.put(resource, value.clone()).await;
                as_records(resource, value)
            }
            Err(err) => {
                tracing::warn!("fetch of {} failed ({}), using cached data", resource, err);
                match self.cache.get(resource).await {
                    Some(cached) => as_records(resource, cached),
                    None => Vec::new(),
                }
            }
        }
    }

    async fn company(&self) -> Option<Value> {
        match self.api.fetch(Resource::Company).await {
            Ok(value) => {
                self.cache.put(Resource::Company, value.clone()).await;
                Some(value)
            }
            Err(err) => {
                tracing::warn!("fetch of company failed ({}), using cached data", err);
                self.cache.get(Resource::Company).await
            }
        }
    }
}

/// Collection endpoints must return arrays; anything else degrades to empty.
fn as_records(resource: Resource, value: Value) -> Vec<Value> {
    match value {
        Value::Array(records) => records,
        other => {
            tracing::warn!(
                "{} returned non-array payload ({}), treating as empty",
                resource,
                other
            );
            Vec::new()
        }
    }
}
