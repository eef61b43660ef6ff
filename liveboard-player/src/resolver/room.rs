// Room Resolver
//
// Polls the platform for a room's snapshot and publishes it through a
// watch channel. Failures are soft: the previous snapshot is retained and
// the next poll tries again.

use crate::config::PollConfig;
use liveboard_platform::{Platform, Room};
use rand::RngExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Background room-snapshot poller for one slot.
pub struct RoomResolver;

impl RoomResolver {
    /// Spawn the poll task. The first resolve happens immediately; each
    /// following one waits a uniformly sampled interval in
    /// `[min_interval, max_interval]` so many slots never poll in
    /// lockstep. The task exits when `cancel` fires.
    pub fn spawn(
        platform: Arc<dyn Platform>,
        room_id: String,
        config: PollConfig,
        cancel: CancellationToken,
    ) -> watch::Receiver<Option<Arc<Room>>> {
        let (tx, rx) = watch::channel(None);
        tokio::spawn(async move {
            loop {
                match platform.get_room(&room_id).await {
                    Ok(Some(room)) => {
                        // wholesale replacement, never a partial update
                        tx.send_replace(Some(Arc::new(room)));
                    }
                    Ok(None) => {
                        debug!(%room_id, "room unknown to platform, keeping last snapshot");
                    }
                    Err(e) => {
                        warn!(%room_id, error = %e, "room refresh failed, keeping last snapshot");
                    }
                }

                let delay = sample_interval(&config);
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
            debug!(%room_id, "room poller stopped");
        });
        rx
    }
}

fn sample_interval(config: &PollConfig) -> std::time::Duration {
    let min = config.min_interval();
    let max = config.max_interval();
    if max <= min {
        return min;
    }
    let millis = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
    std::time::Duration::from_millis(millis)
}
