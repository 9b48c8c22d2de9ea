//! Periodic repair of waitlist positions.
//!
//! Renumbering after a status change is best-effort; this loop renumbers
//! every restaurant with waiting entries on a fixed interval so a missed
//! renumber never persists. Renumbering only writes rows whose values
//! differ, so a pass over a healthy queue is read-only.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::engine::waitlist_queue::WaitlistQueue;

/// Run the reconciler until `cancel` is triggered.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Position reconciler started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Position reconciler stopping");
                break;
            }
            _ = ticker.tick() => {
                match WaitlistQueue::new(&pool).renumber_all().await {
                    Ok(0) => tracing::debug!("Position reconciler: queues consistent"),
                    Ok(written) => {
                        tracing::info!(written, "Position reconciler: repaired positions");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Position reconciler: pass failed");
                    }
                }
            }
        }
    }
}
