use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::dispatcher::ReminderDispatcher;

/// Handle to the background sweep loop.
///
/// Dropping the handle leaves the task running; call
/// [`ReminderScheduler::shutdown`] for a clean stop.
pub struct ReminderScheduler {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReminderScheduler {
    /// Spawn the loop. The first sweep fires at the next top of the hour.
    pub fn spawn(dispatcher: Arc<ReminderDispatcher>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(dispatcher, shutdown_rx));
        Self { shutdown_tx, task }
    }

    /// Signal the loop to stop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

async fn run(dispatcher: Arc<ReminderDispatcher>, mut shutdown: watch::Receiver<bool>) {
    info!("reminder scheduler started");
    loop {
        let wait = until_next_hour(Utc::now());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                // Sweeps run detached so a slow mail provider never delays
                // the next tick. Nothing stops two sweeps from overlapping;
                // the per-user window check makes a duplicate send unlikely
                // but not impossible.
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    if let Err(e) = dispatcher.run_sweep(Utc::now()).await {
                        error!("reminder sweep error: {e}");
                    }
                });
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("reminder scheduler shutting down");
                    break;
                }
            }
        }
    }
}

/// Sleep duration until the next top of the hour. Always in (0, 3600]
/// seconds: at exactly :00 the next tick is a full hour away.
fn until_next_hour(now: DateTime<Utc>) -> Duration {
    let secs_into_hour = (now.minute() * 60 + now.second()) as u64;
    Duration::from_secs(3600 - secs_into_hour)
}
