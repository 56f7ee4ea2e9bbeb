// ABOUTME: The slot store: a small, quota-limited JSON file of retained snapshots.
// ABOUTME: Newest-first list with prepend-and-truncate retention and atomic writes.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use gysd_core::{RETENTION_CAP, Snapshot};
use thiserror::Error;

/// Serialized-size quota for the whole retained list. The slot store plays
/// the role of a small synchronous key/value slot, so writes that would blow
/// past this are refused rather than silently truncated.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Errors that can occur during slot store operations.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("slot store quota exceeded: {size} bytes > {quota}")]
    QuotaExceeded { size: usize, quota: usize },
}

/// The size-limited snapshot backend: one JSON file holding the retained
/// snapshots newest-first, capped at the retention limit.
pub struct SlotStore {
    path: PathBuf,
    cap: usize,
    quota_bytes: usize,
}

impl SlotStore {
    /// A slot store at the given file path with the standard cap and quota.
    pub fn new(path: PathBuf) -> Self {
        Self::with_limits(path, RETENTION_CAP, DEFAULT_QUOTA_BYTES)
    }

    /// A slot store with explicit retention cap and byte quota.
    pub fn with_limits(path: PathBuf, cap: usize, quota_bytes: usize) -> Self {
        Self {
            path,
            cap,
            quota_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a snapshot at the front of the retained list and evict anything
    /// beyond the cap. An unreadable existing list is reset rather than
    /// propagated, so one corrupt write cannot wedge future backups. The new
    /// list is written atomically (tmp file, fsync, rename).
    pub fn put(&self, snapshot: &Snapshot) -> Result<(), SlotError> {
        let mut retained = match self.list() {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("slot store unreadable ({}), resetting", err);
                Vec::new()
            }
        };

        retained.insert(0, snapshot.clone());
        retained.truncate(self.cap);

        let json = serde_json::to_string(&retained)?;
        if json.len() > self.quota_bytes {
            return Err(SlotError::QuotaExceeded {
                size: json.len(),
                quota: self.quota_bytes,
            });
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// The retained snapshots, newest first. A missing file is an empty list;
    /// a corrupt file is an error, which readers degrade as they see fit.
    pub fn list(&self) -> Result<Vec<Snapshot>, SlotError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Look up a retained snapshot by timestamp.
    pub fn get(&self, timestamp: i64) -> Result<Option<Snapshot>, SlotError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|snapshot| snapshot.timestamp == timestamp))
    }

    /// How many snapshots the store currently retains; unreadable counts as 0.
    pub fn count(&self) -> usize {
        self.list().map(|list| list.len()).unwrap_or(0)
    }
}
