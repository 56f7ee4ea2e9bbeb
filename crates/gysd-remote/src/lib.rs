// ABOUTME: Remote-resource layer for gysd: the gYS REST API seam and the query cache.
// ABOUTME: Provides the RemoteApi trait, reqwest-backed client, collector, and a test stub.

pub mod api;
pub mod cache;
pub mod collector;
pub mod testing;

pub use api::{ApiError, HttpApi, RemoteApi};
pub use cache::QueryCache;
pub use collector::Collector;
