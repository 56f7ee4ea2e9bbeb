// ABOUTME: Snapshot data model for point-in-time captures of gYS business data.
// ABOUTME: Defines the snapshot envelope, entity sets, origin metadata, and trigger kinds.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resource::Resource;

/// Format identifier written into every snapshot for forward compatibility.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Maximum number of snapshots a single backend retains before evicting the oldest.
pub const RETENTION_CAP: usize = 10;

/// How far back a crash-triggered snapshot is still offered for recovery.
pub const RECOVERY_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Default periodic backup interval: five minutes.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Why a snapshot was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Scheduled,
    Manual,
    Crash,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Scheduled => write!(f, "scheduled"),
            Trigger::Manual => write!(f, "manual"),
            Trigger::Crash => write!(f, "crash"),
        }
    }
}

/// Metadata recording where and why a snapshot was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub agent: String,
    pub source_url: String,
    pub trigger: Trigger,
}

/// The five tracked entity collections. Records are opaque JSON owned by the
/// gYS API; gysd never inspects their fields. The four list keys are always
/// present (empty when a fetch failed with no cached fallback); `company` is
/// absent when the profile could not be read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySet {
    #[serde(default)]
    pub products: Vec<Value>,
    #[serde(default)]
    pub clients: Vec<Value>,
    #[serde(default)]
    pub sales: Vec<Value>,
    #[serde(default)]
    pub categories: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Value>,
}

impl EntitySet {
    /// The records for a list-shaped resource, or None for `company`.
    pub fn collection(&self, resource: Resource) -> Option<&[Value]> {
        match resource {
            Resource::Products => Some(&self.products),
            Resource::Clients => Some(&self.clients),
            Resource::Sales => Some(&self.sales),
            Resource::Categories => Some(&self.categories),
            Resource::Company => None,
        }
    }

    /// Total record count across the four lists, plus one if a company
    /// profile is present. Used for logging and CLI summaries.
    pub fn total_records(&self) -> usize {
        self.products.len()
            + self.clients.len()
            + self.sales.len()
            + self.categories.len()
            + usize::from(self.company.is_some())
    }
}

/// One full point-in-time capture of the tracked gYS entity collections.
/// The millisecond `timestamp` is the snapshot's identity: it is the sort
/// key, the dedupe key across backends, and the handle restore operates on.
/// Two snapshots minted in the same millisecond collide; that limitation is
/// inherited from the data model and left undisambiguated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: i64,
    pub schema_version: String,
    pub entities: EntitySet,
    pub origin: Origin,
}

impl Snapshot {
    /// Assemble a snapshot with the current schema version.
    pub fn new(timestamp: i64, entities: EntitySet, origin: Origin) -> Self {
        Self {
            timestamp,
            schema_version: SCHEMA_VERSION.to_string(),
            entities,
            origin,
        }
    }

    /// The creation instant as a chrono timestamp, if the millisecond value
    /// is representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}
