//! Periodic snapshot regeneration.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use ct_core::time::now_unix_secs;
use ct_sim::LiveSnapshots;

/// Spawn a task that calls [`LiveSnapshots::refresh`] every `every`.
///
/// The first refresh happens one full interval after the call; the provider
/// already holds a snapshot from construction.  Missed ticks are skipped
/// rather than bunched.
pub fn spawn_refresh(live: Arc<LiveSnapshots>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let snapshot = live.refresh(now_unix_secs());
            debug!(
                timestamp = snapshot.timestamp,
                roads = snapshot.len(),
                vehicles = snapshot.total_vehicles(),
                "snapshot refreshed"
            );
        }
    })
}
