// ABOUTME: Snapshot export and import: moving backups in and out as JSON files.
// ABOUTME: Export reads the slot store only; import writes both backends directly.

use std::fs;
use std::path::{Path, PathBuf};

use gysd_core::{EntitySet, Origin, SCHEMA_VERSION, Snapshot, Trigger};
use serde::Deserialize;
use thiserror::Error;

use crate::manager::BackupManager;

/// Errors that can occur while exporting a snapshot.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("no backup with timestamp {0} in the slot store")]
    NotFound(i64),

    #[error("slot store error: {0}")]
    Slot(#[from] gysd_store::SlotError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A backup file as users hand them around: `timestamp` and `entities` are
/// required, the rest of the envelope is optional and defaulted on import.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedSnapshot {
    timestamp: i64,
    entities: EntitySet,
    #[serde(default)]
    schema_version: Option<String>,
    #[serde(default)]
    origin: Option<Origin>,
}

impl ImportedSnapshot {
    fn into_snapshot(self) -> Snapshot {
        Snapshot {
            timestamp: self.timestamp,
            schema_version: self
                .schema_version
                .unwrap_or_else(|| SCHEMA_VERSION.to_string()),
            entities: self.entities,
            origin: self.origin.unwrap_or_else(|| Origin {
                agent: "import".to_string(),
                source_url: String::new(),
                trigger: Trigger::Manual,
            }),
        }
    }
}

impl BackupManager {
    /// Write the snapshot with the given timestamp to a dated JSON file in
    /// `dir` and return its path. Only the slot store is consulted; a
    /// snapshot that survives solely in the document store is not exportable.
    pub fn export_to_file(&self, timestamp: i64, dir: &Path) -> Result<PathBuf, TransferError> {
        let snapshot = self
            .slots
            .get(timestamp)?
            .ok_or(TransferError::NotFound(timestamp))?;

        let date = snapshot
            .created_at()
            .map(|instant| instant.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| timestamp.to_string());
        let path = dir.join(format!("gys-backup-{}.json", date));

        fs::create_dir_all(dir)?;
        fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;

        tracing::info!("exported backup {} to {}", timestamp, path.display());
        Ok(path)
    }

    /// Import a backup file, writing it into both backends exactly as a fresh
    /// snapshot would be: no collection, no rate limiting. Returns false on
    /// unreadable, unparseable, or incomplete input; nothing is written in
    /// that case.
    pub async fn import_from_file(&self, path: &Path) -> bool {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("could not read backup file {}: {}", path.display(), err);
                return false;
            }
        };
        self.import_json(&raw).await
    }

    /// Import a backup from raw JSON text. See [`Self::import_from_file`].
    pub async fn import_json(&self, raw: &str) -> bool {
        let imported: ImportedSnapshot = match serde_json::from_str(raw) {
            Ok(imported) => imported,
            Err(err) => {
                tracing::warn!("invalid backup file: {}", err);
                return false;
            }
        };

        let snapshot = imported.into_snapshot();
        tracing::info!(
            "importing backup {} ({} records)",
            snapshot.timestamp,
            snapshot.entities.total_records()
        );
        self.store_snapshot(&snapshot).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use gysd_remote::QueryCache;
    use gysd_remote::testing::StubApi;
    use gysd_store::{DismissalKey, DocStore, SlotStore};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::config::GysdConfig;

    fn make_manager(dir: &TempDir) -> Arc<BackupManager> {
        let config = GysdConfig {
            api_url: "http://127.0.0.1:5000".to_string(),
            data_dir: dir.path().to_path_buf(),
            interval: Duration::from_secs(300),
            agent: "gysd-test".to_string(),
        };
        Arc::new(BackupManager::new(
            &config,
            Arc::new(StubApi::new()),
            Arc::new(QueryCache::new()),
            Arc::new(SlotStore::new(dir.path().join("slots.json"))),
            Arc::new(DocStore::open(&dir.path().join("snapshots.db")).unwrap()),
            DismissalKey::new(dir.path().join("dismissed")),
        ))
    }

    #[tokio::test]
    async fn import_lands_in_both_backends() {
        let dir = TempDir::new().unwrap();
        let manager = make_manager(&dir);

        let accepted = manager
            .import_json(
                r#"{"timestamp": 5000, "entities": {"products": [{"id": 1, "name": "X"}], "clients": [], "sales": [], "categories": []}}"#,
            )
            .await;

        assert!(accepted);
        let from_slots = manager.slots.get(5000).unwrap().unwrap();
        assert_eq!(from_slots.entities.products[0]["name"], json!("X"));
        assert!(manager.docs.get(5000).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn import_defaults_the_envelope() {
        let dir = TempDir::new().unwrap();
        let manager = make_manager(&dir);

        manager
            .import_json(r#"{"timestamp": 5000, "entities": {}}"#)
            .await;

        let snapshot = manager.slots.get(5000).unwrap().unwrap();
        assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
        assert_eq!(snapshot.origin.agent, "import");
        assert_eq!(snapshot.origin.trigger, Trigger::Manual);
    }

    #[tokio::test]
    async fn import_rejects_incomplete_or_garbage_input() {
        let dir = TempDir::new().unwrap();
        let manager = make_manager(&dir);

        assert!(!manager.import_json("not json").await);
        assert!(!manager.import_json(r#"{"entities": {}}"#).await, "missing timestamp");
        assert!(!manager.import_json(r#"{"timestamp": 5}"#).await, "missing entities");

        assert_eq!(manager.slots.count(), 0, "nothing may be written");
        assert_eq!(manager.docs.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn import_from_missing_file_is_false() {
        let dir = TempDir::new().unwrap();
        let manager = make_manager(&dir);

        assert!(!manager.import_from_file(&dir.path().join("nope.json")).await);
    }

    #[tokio::test]
    async fn export_round_trips_through_import() {
        let dir = TempDir::new().unwrap();
        let manager = make_manager(&dir);

        manager
            .import_json(
                r#"{"timestamp": 1700000000000, "entities": {"products": [{"id": 1}], "clients": [], "sales": [], "categories": []}}"#,
            )
            .await;

        let out_dir = dir.path().join("exports");
        let path = manager.export_to_file(1_700_000_000_000, &out_dir).unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("gys-backup-"));
        assert!(path.to_string_lossy().ends_with(".json"));

        // A fresh manager can take the artifact back in.
        let other_dir = TempDir::new().unwrap();
        let other = make_manager(&other_dir);
        assert!(other.import_from_file(&path).await);
        assert!(other.slots.get(1_700_000_000_000).unwrap().is_some());
    }

    #[tokio::test]
    async fn export_of_unknown_timestamp_errors() {
        let dir = TempDir::new().unwrap();
        let manager = make_manager(&dir);

        let result = manager.export_to_file(42, dir.path());
        assert!(matches!(result, Err(TransferError::NotFound(42))));
    }

    #[tokio::test]
    async fn export_ignores_doc_store_only_snapshots() {
        let dir = TempDir::new().unwrap();
        let manager = make_manager(&dir);

        // Seed the document store directly; the slot store stays empty.
        let snapshot = Snapshot::new(
            9000,
            EntitySet::default(),
            Origin {
                agent: "test".to_string(),
                source_url: String::new(),
                trigger: Trigger::Manual,
            },
        );
        manager.docs.put(&snapshot).await.unwrap();

        assert!(manager.catalog.find(9000).await.is_some(), "visible in the catalog");
        let result = manager.export_to_file(9000, dir.path());
        assert!(matches!(result, Err(TransferError::NotFound(9000))));
    }
}
