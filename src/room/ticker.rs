use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    common::now_ms,
    room::{Broadcaster, RoomRegistry},
};

/// Spawns the process-wide ticker: every `period` it syncs all playing rooms
/// and advances the ones whose track has run out.
pub fn spawn(
    registry: Arc<RoomRegistry>,
    out: Arc<dyn Broadcaster>,
    period: Duration,
) -> JoinHandle<()> {
    info!("Starting room ticker every {:?}", period);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let report = registry.tick(now_ms(), out.as_ref());
            if report.advanced > 0 || report.evicted > 0 {
                debug!(
                    synced = report.synced,
                    advanced = report.advanced,
                    evicted = report.evicted,
                    "tick"
                );
            }
        }
    })
}
