//! Purging of long soft-deleted tasks.

use crate::config::RetentionConfig;
use crate::db::{Database, now_ms};
use crate::revalidate::{MutationKind, RevalidationBus};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub deleted: usize,
    /// Tasks deleted before this instant (ms since epoch) were purged.
    pub cutoff: i64,
}

impl SweepReport {
    pub fn cutoff_rfc3339(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.cutoff)
            .map(|d| d.to_rfc3339())
            .unwrap_or_default()
    }
}

/// Permanently delete every task soft-deleted before `now - retention`.
pub fn run_sweep(
    db: &Database,
    bus: &RevalidationBus,
    config: &RetentionConfig,
    now: i64,
) -> Result<SweepReport> {
    let cutoff = now - config.retention_ms();
    let deleted = db.purge_deleted_before(cutoff)?;
    if deleted > 0 {
        bus.notify(&[MutationKind::TasksPurged]);
    }
    info!(deleted, cutoff, "Retention sweep finished");
    Ok(SweepReport { deleted, cutoff })
}

/// Handle for the background sweeper.
pub struct RetentionHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl RetentionHandle {
    /// Stop the sweeper and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.join.await;
    }
}

/// Run [`run_sweep`] on the configured interval, starting immediately.
pub fn start_retention_sweeper(
    db: Arc<Database>,
    bus: Arc<RevalidationBus>,
    config: RetentionConfig,
) -> RetentionHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let period = config.sweep_interval();
    info!(days = config.days, ?period, "Retention sweeper started");

    let join = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = run_sweep(&db, &bus, &config, now_ms()) {
                        error!("Retention sweep failed: {}", e);
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("Retention sweeper shutting down");
                    break;
                }
            }
        }
    });

    RetentionHandle {
        shutdown_tx: Some(shutdown_tx),
        join,
    }
}
