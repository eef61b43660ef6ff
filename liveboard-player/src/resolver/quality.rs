// Quality Resolver
//
// Fetches and ranks a room's quality tiers. Results are cached by room
// identity: snapshot refreshes of the same room reuse the ranked list
// without touching the platform.

use liveboard_platform::{Platform, Quality, Room, RoomKey};
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::warn;

pub struct QualityResolver {
    platform: Arc<dyn Platform>,
    cache: Mutex<Option<(RoomKey, Arc<Vec<Quality>>)>>,
}

impl QualityResolver {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            cache: Mutex::new(None),
        }
    }

    /// Resolve the ranked quality list for a room.
    ///
    /// Absent or offline rooms resolve to an empty list without a platform
    /// call. Ranking is descending by priority and stable on ties, so
    /// equal-priority tiers keep the platform's order. Fetch failure is a
    /// soft failure resolving to an empty list.
    pub async fn resolve(&self, room: Option<&Room>) -> Arc<Vec<Quality>> {
        let Some(room) = room else {
            return Arc::new(Vec::new());
        };
        if !room.is_online {
            return Arc::new(Vec::new());
        }

        let key = room.key();
        if let Some((cached_key, list)) = self.cache.lock().as_ref() {
            if *cached_key == key {
                return list.clone();
            }
        }

        match self.platform.get_qualities(&room.id).await {
            Ok(mut qualities) => {
                // stable: ties keep resolver-provided order
                qualities.sort_by_key(|q| Reverse(q.priority));
                let list = Arc::new(qualities);
                *self.cache.lock() = Some((key, list.clone()));
                list
            }
            Err(e) => {
                warn!(room = %key, error = %e, "quality resolve failed");
                Arc::new(Vec::new())
            }
        }
    }
}
