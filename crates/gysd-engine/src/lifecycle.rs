// ABOUTME: Lifecycle signal source: the host events that trigger unscheduled backups.
// ABOUTME: Provides the event type plus panic-hook and signal wiring for the binary.

use tokio::sync::mpsc::UnboundedSender;

/// Host lifecycle events the backup engine reacts to. The binary wires these
/// from process signals and the panic hook; embedders supervising their own
/// background tasks can forward a join failure as `TaskFailure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The process is shutting down (SIGINT/SIGTERM). Triggers one final
    /// manual backup.
    Terminating,
    /// A panic was raised somewhere in the process. Triggers a crash backup.
    Panic,
    /// A supervised background task died. Triggers a crash backup.
    TaskFailure,
}

/// Chain a panic hook that forwards a `Panic` event before the previous hook
/// runs. The send is best-effort: if the receiver is gone the panic proceeds
/// unobserved.
pub fn install_panic_hook(events: UnboundedSender<LifecycleEvent>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = events.send(LifecycleEvent::Panic);
        previous(info);
    }));
}

/// Wait for a termination signal, then forward a `Terminating` event.
pub async fn forward_termination(events: UnboundedSender<LifecycleEvent>) {
    wait_for_signal().await;
    let _ = events.send(LifecycleEvent::Terminating);
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!("could not install SIGTERM handler: {}", err);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
