//! Daily warming rollover job.
//!
//! Checks hourly for schedules whose daily target belongs to a past local
//! calendar day and advances them: bump `current_day`, reset the day
//! counters, clear the target so the next cycle resamples. The hourly
//! cadence keeps the job cheap while catching the local-midnight boundary
//! within an hour regardless of the configured UTC offset.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use warmline_engine::Engine;

/// How often the rollover check runs.
const ROLLOVER_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the rollover loop until `cancel` is triggered.
pub async fn run(engine: Arc<Engine>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = ROLLOVER_INTERVAL.as_secs(),
        "Rollover job started"
    );

    let mut interval = tokio::time::interval(ROLLOVER_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rollover job stopping");
                break;
            }
            _ = interval.tick() => {
                match engine.run_daily_rollover().await {
                    Ok(rolled) => {
                        if rolled > 0 {
                            tracing::info!(rolled, "Rollover: schedules advanced");
                        } else {
                            tracing::debug!("Rollover: nothing due");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rollover failed");
                    }
                }
            }
        }
    }
}
