// Platform Trait
//
// The contract between the player core and a streaming site.

use crate::error::PlatformError;
use crate::types::{Quality, Room};
use async_trait::async_trait;

/// A pluggable streaming platform.
///
/// Implementations wrap whatever transport the site needs (HTTP API, IPC
/// bridge to a host shell). All three calls are keyed by the platform's own
/// room id; quality ranking and endpoint labeling happen in the player, not
/// here.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Platform id (e.g., "bili"), matching [`crate::types::PlatformInfo::id`]
    /// in returned rooms.
    fn id(&self) -> &str;

    /// Fetch the current snapshot of a room.
    ///
    /// `Ok(None)` means the room is unknown; the player keeps its previous
    /// snapshot in that case, same as for `Err`.
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, PlatformError>;

    /// List the quality tiers currently offered for a room, in platform
    /// order. The player sorts by priority; ties keep this order.
    async fn get_qualities(&self, room_id: &str) -> Result<Vec<Quality>, PlatformError>;

    /// Resolve raw stream endpoints for a room at a given quality.
    async fn get_live_urls(
        &self,
        room_id: &str,
        quality_id: &str,
    ) -> Result<Vec<String>, PlatformError>;
}
