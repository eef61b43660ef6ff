// Live URL Resolver
//
// Turns (room, quality) into labeled stream endpoints. Platforms return
// bare strings; lines are labeled by position in arrival order.

use liveboard_platform::{LiveUrl, Platform, Room};
use std::sync::Arc;
use tracing::warn;

pub struct LiveUrlResolver {
    platform: Arc<dyn Platform>,
}

impl LiveUrlResolver {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Resolve endpoints for a room at a quality.
    ///
    /// Absent/offline room or absent quality resolves to an empty list
    /// without a platform call; so does a fetch failure.
    pub async fn resolve(&self, room: Option<&Room>, quality_id: Option<&str>) -> Vec<LiveUrl> {
        let Some(room) = room else {
            return Vec::new();
        };
        if !room.is_online {
            return Vec::new();
        }
        let Some(quality_id) = quality_id else {
            return Vec::new();
        };

        match self.platform.get_live_urls(&room.id, quality_id).await {
            Ok(urls) => urls
                .into_iter()
                .enumerate()
                .map(|(i, url)| LiveUrl {
                    name: format!("Line {}", i + 1),
                    url,
                })
                .collect(),
            Err(e) => {
                warn!(room = %room.key(), quality_id, error = %e, "live url resolve failed");
                Vec::new()
            }
        }
    }
}
