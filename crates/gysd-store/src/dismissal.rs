// ABOUTME: Durable record of the last crash-recovery snapshot the user dismissed.
// ABOUTME: One timestamp in its own file, kept separate from the retention stores.

use std::fs;
use std::path::{Path, PathBuf};

/// Remembers which crash snapshot the user already declined, so the recovery
/// detector offers each one at most once. Lives in its own file so evicting
/// or wiping the retention stores never forgets a dismissal.
pub struct DismissalKey {
    path: PathBuf,
}

impl DismissalKey {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The dismissed timestamp, if one was recorded and still parses.
    pub fn get(&self) -> Option<i64> {
        let contents = fs::read_to_string(&self.path).ok()?;
        contents.trim().parse().ok()
    }

    /// Record a dismissal, replacing any previous one.
    pub fn set(&self, timestamp: i64) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, timestamp.to_string())
    }
}
