// ABOUTME: The gYS REST API seam: a trait for reading and re-creating entity records.
// ABOUTME: HttpApi implements it over reqwest against GET/POST /api/<resource> endpoints.

use async_trait::async_trait;
use gysd_core::Resource;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur talking to the gYS API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {resource}")]
    Status { resource: Resource, status: u16 },
}

/// Read and create operations against the remote gYS resources. Record shapes
/// are opaque pass-through JSON; field-level validation belongs to the API.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch the full contents of a resource: a JSON array for the four
    /// collections, a single object for `company`. Non-2xx responses
    /// (including company's 404 when no profile exists) are errors.
    async fn fetch(&self, resource: Resource) -> Result<Value, ApiError>;

    /// Create one record on a resource.
    async fn create(&self, resource: Resource, record: &Value) -> Result<(), ApiError>;
}

/// A reqwest-backed RemoteApi pointed at a gYS deployment.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), resource.path())
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn fetch(&self, resource: Resource) -> Result<Value, ApiError> {
        let response = self.client.get(self.url_for(resource)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn create(&self, resource: Resource, record: &Value) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url_for(resource))
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
