// ABOUTME: Crash-recovery detection: finds a fresh, unconsumed crash backup at startup.
// ABOUTME: Offers each crash snapshot at most once, honoring the durable dismissal record.

use chrono::Utc;
use gysd_core::{RECOVERY_WINDOW_MS, Snapshot, Trigger};

use crate::manager::BackupManager;

impl BackupManager {
    /// Look for a crash backup worth offering to the user.
    ///
    /// Returns the newest crash-triggered snapshot in the merged catalog,
    /// unless it is older than the recovery window or the user already
    /// dismissed that exact timestamp. Intended to run once per process
    /// start, after the application has finished its own initial load.
    pub async fn check_for_recovery(&self) -> Option<Snapshot> {
        let candidate = self
            .list()
            .await
            .into_iter()
            .find(|snapshot| snapshot.origin.trigger == Trigger::Crash)?;

        let age_ms = Utc::now().timestamp_millis() - candidate.timestamp;
        if age_ms > RECOVERY_WINDOW_MS {
            tracing::debug!(
                "newest crash backup {} is outside the recovery window",
                candidate.timestamp
            );
            return None;
        }

        if self.dismissed.get() == Some(candidate.timestamp) {
            tracing::debug!("crash backup {} was already dismissed", candidate.timestamp);
            return None;
        }

        tracing::info!("crash backup {} is available for recovery", candidate.timestamp);
        Some(candidate)
    }

    /// Record that the user declined the crash backup with this timestamp,
    /// so it is never offered again.
    pub fn dismiss_recovery(&self, timestamp: i64) {
        if let Err(err) = self.dismissed.set(timestamp) {
            tracing::warn!("could not record dismissal of {}: {}", timestamp, err);
        }
    }
}
