// ABOUTME: The backup scheduler: a periodic tokio task plus lifecycle-event triggers.
// ABOUTME: Scheduled ticks persist through the rate limiter; lifecycle faults bypass it.

use std::sync::Arc;

use gysd_core::Trigger;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::lifecycle::LifecycleEvent;
use crate::manager::BackupManager;

impl BackupManager {
    /// Start the periodic backup timer. Idempotent: a second start while
    /// active is a no-op. The first scheduled backup lands one full interval
    /// after start.
    pub async fn start_scheduler(self: &Arc<Self>) {
        let mut guard = self.scheduler.lock().await;
        if guard.is_some() {
            tracing::debug!("scheduler already active");
            return;
        }

        let manager = Arc::clone(self);
        let period = self.interval;
        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval yields immediately; consume that tick so the loop
            // waits a full period before the first scheduled backup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                manager.persist(Trigger::Scheduled).await;
            }
        }));

        tracing::info!("periodic backups every {:?}", period);
    }

    /// Stop the periodic backup timer, if running.
    pub async fn stop_scheduler(&self) {
        if let Some(task) = self.scheduler.lock().await.take() {
            task.abort();
            tracing::info!("periodic backups stopped");
        }
    }

    pub async fn scheduler_active(&self) -> bool {
        self.scheduler.lock().await.is_some()
    }

    /// Subscribe to lifecycle events, independent of the periodic timer.
    ///
    /// A terminating host gets one final best-effort manual backup (it may
    /// not complete if the process is killed first); faults take crash
    /// backups and keep listening. The task ends when the channel closes or
    /// a termination event was handled.
    pub fn watch_lifecycle(
        self: &Arc<Self>,
        mut events: UnboundedReceiver<LifecycleEvent>,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    LifecycleEvent::Terminating => {
                        tracing::info!("termination signal, taking a final backup");
                        manager.persist(Trigger::Manual).await;
                        break;
                    }
                    LifecycleEvent::Panic | LifecycleEvent::TaskFailure => {
                        tracing::warn!("fault detected, taking a crash backup");
                        manager.persist(Trigger::Crash).await;
                    }
                }
            }
        })
    }
}
