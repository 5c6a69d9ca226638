//! Periodic warming dispatch trigger.
//!
//! Spawns a background task that runs one dispatch cycle on a fixed
//! interval using `tokio::time::interval`. The cycle itself is a no-op
//! outside active hours and self-guards against overlap, so the loop just
//! fires and logs.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use warmline_engine::dispatch::CycleStatus;
use warmline_engine::Engine;

/// Run the dispatch trigger loop until `cancel` is triggered.
pub async fn run(engine: Arc<Engine>, interval_secs: u64, cancel: CancellationToken) {
    tracing::info!(interval_secs, "Dispatch loop started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dispatch loop stopping");
                break;
            }
            _ = interval.tick() => {
                match engine.run_dispatch_cycle().await {
                    Ok(report) => match report.status {
                        CycleStatus::Completed => tracing::info!(
                            schedules = report.results.len(),
                            sent = report.sent_count(),
                            "Dispatch cycle completed"
                        ),
                        CycleStatus::AlreadyRunning => tracing::warn!(
                            "Dispatch cycle overlapped the previous run, skipped"
                        ),
                        CycleStatus::OutsideActiveHours => tracing::debug!(
                            "Dispatch cycle outside active hours, skipped"
                        ),
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }
    }
}
