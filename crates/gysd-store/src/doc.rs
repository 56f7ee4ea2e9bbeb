// ABOUTME: The document store: a sqlite-backed snapshot backend keyed by timestamp.
// ABOUTME: Upserts snapshot bodies and trims the oldest rows beyond the retention cap.

use std::path::Path;

use gysd_core::{RETENTION_CAP, Snapshot};
use rusqlite::{Connection, params};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The higher-capacity snapshot backend. Each snapshot is one row keyed by
/// its millisecond timestamp, with the full snapshot serialized as JSON in
/// the body column. All access goes through an async mutex so callers share
/// one connection safely.
pub struct DocStore {
    conn: Mutex<Connection>,
    cap: usize,
}

impl DocStore {
    /// Open or create a document store at the given path with the standard cap.
    pub fn open(path: &Path) -> Result<Self, DocError> {
        Self::open_with_cap(path, RETENTION_CAP)
    }

    /// Open with an explicit retention cap. Tests use a large cap to model an
    /// effectively unbounded backend.
    pub fn open_with_cap(path: &Path, cap: usize) -> Result<Self, DocError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS snapshots (
                timestamp INTEGER PRIMARY KEY,
                body TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            cap,
        })
    }

    /// Upsert a snapshot keyed by its timestamp, then delete the oldest
    /// surplus rows so at most `cap` remain.
    pub async fn put(&self, snapshot: &Snapshot) -> Result<(), DocError> {
        let body = serde_json::to_string(snapshot)?;
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO snapshots (timestamp, body) VALUES (?1, ?2)
             ON CONFLICT(timestamp) DO UPDATE SET body = excluded.body",
            params![snapshot.timestamp, body],
        )?;

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        let surplus = count - self.cap as i64;
        if surplus > 0 {
            conn.execute(
                "DELETE FROM snapshots WHERE timestamp IN (
                    SELECT timestamp FROM snapshots ORDER BY timestamp ASC LIMIT ?1
                )",
                params![surplus],
            )?;
        }

        Ok(())
    }

    /// All retained snapshots, newest first.
    pub async fn list(&self) -> Result<Vec<Snapshot>, DocError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT body FROM snapshots ORDER BY timestamp DESC")?;

        let rows = stmt.query_map([], |row| {
            let body: String = row.get(0)?;
            Ok(body)
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let body = row?;
            snapshots.push(serde_json::from_str(&body)?);
        }
        Ok(snapshots)
    }

    /// Look up a retained snapshot by timestamp.
    pub async fn get(&self, timestamp: i64) -> Result<Option<Snapshot>, DocError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT body FROM snapshots WHERE timestamp = ?1")?;

        let mut rows = stmt.query_map(params![timestamp], |row| {
            let body: String = row.get(0)?;
            Ok(body)
        })?;

        match rows.next() {
            Some(row) => Ok(Some(serde_json::from_str(&row?)?)),
            None => Ok(None),
        }
    }

    /// How many snapshots the store currently retains.
    pub async fn count(&self) -> Result<usize, DocError> {
        let conn = self.conn.lock().await;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
