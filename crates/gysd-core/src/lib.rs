// ABOUTME: Core library for gysd, containing the snapshot data model and resource map.
// ABOUTME: This crate defines the shared types used across all gysd components.

pub mod resource;
pub mod snapshot;

pub use resource::Resource;
pub use snapshot::{
    DEFAULT_INTERVAL_SECS, EntitySet, Origin, RECOVERY_WINDOW_MS, RETENTION_CAP, SCHEMA_VERSION,
    Snapshot, Trigger,
};
