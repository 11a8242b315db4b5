//! Background eviction of stale game servers

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::manager::RegistryManager;

/// Handle to a running sweeper task
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request cancellation and wait for the task to exit
    ///
    /// A sweep already in progress runs to completion first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Sweeper task ended abnormally: {}", e);
        }
    }
}

/// Spawn the periodic sweeper
///
/// Returns `None` without spawning anything when heartbeats are disabled.
pub fn spawn_sweeper(
    manager: Arc<RegistryManager>,
    cancel: CancellationToken,
) -> Option<SweeperHandle> {
    let settings = manager.settings();
    if !settings.heartbeat_enabled {
        info!("Heartbeat disabled, sweeper not started");
        return None;
    }

    let interval = settings.sweep_interval();
    info!(
        "Starting sweeper (interval: {}s, timeout: {}s)",
        settings.sweep_interval_secs, settings.heartbeat_timeout_secs
    );

    let token = cancel.clone();
    let task = tokio::spawn(async move {
        loop {
            if token.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            if token.is_cancelled() {
                break;
            }

            let report = manager.sweep_inactive().await;
            if report.evicted > 0 || report.orphans_removed > 0 || report.failed > 0 {
                info!(
                    "Sweep: {} scanned, {} evicted, {} orphans removed, {} failed",
                    report.scanned, report.evicted, report.orphans_removed, report.failed
                );
            } else {
                debug!("Sweep: {} scanned, nothing stale", report.scanned);
            }
        }

        info!("Sweeper stopped");
    });

    Some(SweeperHandle { cancel, task })
}
