// ABOUTME: Test utilities for gysd-remote, including a programmable stub API.
// ABOUTME: Used in tests to simulate the gYS REST API without a live server.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gysd_core::Resource;
use serde_json::Value;

use crate::api::{ApiError, RemoteApi};

/// A stub RemoteApi with preset responses and injectable failures.
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing the stub to a collector or manager. Resources without preset
/// data answer 404, mirroring an endpoint with nothing behind it.
#[derive(Clone, Default)]
pub struct StubApi {
    inner: Arc<StubState>,
}

#[derive(Default)]
struct StubState {
    responses: Mutex<HashMap<Resource, Value>>,
    failing: Mutex<HashSet<Resource>>,
    reject_next: Mutex<HashSet<Resource>>,
    created: Mutex<Vec<(Resource, Value)>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a collection resource's records.
    pub fn with_collection(self, resource: Resource, records: Vec<Value>) -> Self {
        self.inner
            .responses
            .lock()
            .unwrap()
            .insert(resource, Value::Array(records));
        self
    }

    /// Preset the company profile.
    pub fn with_company(self, record: Value) -> Self {
        self.inner
            .responses
            .lock()
            .unwrap()
            .insert(Resource::Company, record);
        self
    }

    /// Make every fetch of a resource fail with a 503 until further notice.
    pub fn fail_fetch(&self, resource: Resource) {
        self.inner.failing.lock().unwrap().insert(resource);
    }

    /// Make the next create on a resource fail with a 422; later ones succeed.
    pub fn reject_next_create(&self, resource: Resource) {
        self.inner.reject_next.lock().unwrap().insert(resource);
    }

    /// Every create call accepted so far, in arrival order.
    pub fn created(&self) -> Vec<(Resource, Value)> {
        self.inner.created.lock().unwrap().clone()
    }

    /// The accepted create payloads for one resource.
    pub fn created_for(&self, resource: Resource) -> Vec<Value> {
        self.inner
            .created
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == resource)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteApi for StubApi {
    async fn fetch(&self, resource: Resource) -> Result<Value, ApiError> {
        if self.inner.failing.lock().unwrap().contains(&resource) {
            return Err(ApiError::Status {
                resource,
                status: 503,
            });
        }

        match self.inner.responses.lock().unwrap().get(&resource) {
            Some(value) => Ok(value.clone()),
            None => Err(ApiError::Status {
                resource,
                status: 404,
            }),
        }
    }

    async fn create(&self, resource: Resource, record: &Value) -> Result<(), ApiError> {
        if self.inner.reject_next.lock().unwrap().remove(&resource) {
            return Err(ApiError::Status {
                resource,
                status: 422,
            });
        }

        self.inner
            .created
            .lock()
            .unwrap()
            .push((resource, record.clone()));
        Ok(())
    }
}
