// ABOUTME: Entry point for the gysd binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and dispatches backup commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gysd_core::Trigger;
use gysd_engine::{BackupManager, GysdConfig, LifecycleEvent, lifecycle};
use gysd_remote::{HttpApi, QueryCache};
use gysd_store::{DismissalKey, DocStore, SlotStore};
use tokio::sync::mpsc;

/// How long after startup the crash-recovery check runs, giving the gYS API
/// a moment to come up before the catalog is consulted.
const RECOVERY_CHECK_DELAY: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(
    name = "gysd",
    about = "Backup, restore, and crash-recovery companion for the gYS business suite",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the backup daemon: periodic backups plus signal and panic hooks
    Run,
    /// Take one manual backup now
    Backup,
    /// List all known backups, newest first
    List,
    /// Print backup status as JSON
    Status,
    /// Replay a backup's records through the gYS API
    Restore { timestamp: i64 },
    /// Write a backup to a JSON file
    Export {
        timestamp: i64,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Import a backup file into both stores
    Import { path: PathBuf },
    /// Decline a crash backup so it is not offered again
    Dismiss { timestamp: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gysd=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = GysdConfig::from_env()?;
    let manager = build_manager(&config)?;

    match cli.command {
        Command::Run => run(manager).await?,
        Command::Backup => {
            if manager.persist(Trigger::Manual).await {
                println!("backup stored");
            } else {
                anyhow::bail!("could not create backup");
            }
        }
        Command::List => {
            let snapshots = manager.list().await;
            if snapshots.is_empty() {
                println!("no backups yet");
            }
            for snapshot in snapshots {
                let date = snapshot
                    .created_at()
                    .map(|instant| instant.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {}  {} records",
                    snapshot.timestamp,
                    date,
                    snapshot.origin.trigger,
                    snapshot.entities.total_records()
                );
            }
        }
        Command::Status => {
            let status = manager.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Restore { timestamp } => {
            if manager.restore(timestamp).await {
                println!("restored backup {timestamp}");
            } else {
                anyhow::bail!("could not restore: no backup with timestamp {timestamp}");
            }
        }
        Command::Export { timestamp, dir } => {
            let path = manager.export_to_file(timestamp, &dir)?;
            println!("wrote {}", path.display());
        }
        Command::Import { path } => {
            if manager.import_from_file(&path).await {
                println!("imported backup file");
            } else {
                anyhow::bail!("invalid backup file");
            }
        }
        Command::Dismiss { timestamp } => {
            manager.dismiss_recovery(timestamp);
            println!("dismissed crash backup {timestamp}");
        }
    }

    Ok(())
}

fn build_manager(config: &GysdConfig) -> anyhow::Result<Arc<BackupManager>> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;

    let api = Arc::new(HttpApi::new(config.api_url.clone()));
    let cache = Arc::new(QueryCache::new());
    let slots = Arc::new(SlotStore::new(config.data_dir.join("slots.json")));
    let docs = Arc::new(DocStore::open(&config.data_dir.join("snapshots.db"))?);
    let dismissed = DismissalKey::new(config.data_dir.join("dismissed"));

    Ok(Arc::new(BackupManager::new(
        config, api, cache, slots, docs, dismissed,
    )))
}

/// The daemon loop: periodic backups, lifecycle hooks, and one recovery check.
async fn run(manager: Arc<BackupManager>) -> anyhow::Result<()> {
    let (events, inbox) = mpsc::unbounded_channel();

    lifecycle::install_panic_hook(events.clone());
    tokio::spawn(lifecycle::forward_termination(events.clone()));

    manager.start_scheduler().await;

    // One recovery check per start, after the stack has settled.
    let startup_manager = Arc::clone(&manager);
    let recovery_check = tokio::spawn(async move {
        tokio::time::sleep(RECOVERY_CHECK_DELAY).await;
        if let Some(snapshot) = startup_manager.check_for_recovery().await {
            tracing::warn!(
                "crash backup {} is available; `gysd restore {}` replays it, `gysd dismiss {}` ignores it",
                snapshot.timestamp,
                snapshot.timestamp,
                snapshot.timestamp
            );
        }
    });

    // A supervised task dying is itself a fault worth a crash backup.
    let fault_events = events.clone();
    tokio::spawn(async move {
        if recovery_check.await.is_err() {
            let _ = fault_events.send(LifecycleEvent::TaskFailure);
        }
    });

    tracing::info!("gysd running, press ctrl-c to stop");
    manager.watch_lifecycle(inbox).await?;
    manager.stop_scheduler().await;

    Ok(())
}
