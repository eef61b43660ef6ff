// Core data types shared between platforms and the player

use serde::{Deserialize, Serialize};

/// Broadcaster identity shown in the room info panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub name: String,
    /// Avatar image URL
    pub avatar_url: String,
}

/// Display identity of the platform a room belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Platform id (e.g., "bili")
    pub id: String,
    pub name: String,
    /// Platform icon URL
    pub icon_url: String,
}

/// One live-stream room.
///
/// Snapshots are immutable: a refresh replaces the whole value (shared as
/// `Arc<Room>` by the player), fields are never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub title: String,
    pub owner: Owner,
    pub is_online: bool,
    /// Cover image URL, used as the player poster until the first frame
    pub cover_url: String,
    pub platform: PlatformInfo,
}

impl Room {
    /// Identity of this room, used for cache keys and stale-result checks.
    #[must_use]
    pub fn key(&self) -> RoomKey {
        RoomKey {
            platform_id: self.platform.id.clone(),
            room_id: self.id.clone(),
        }
    }
}

/// `(platform, room)` identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomKey {
    pub platform_id: String,
    pub room_id: String,
}

impl RoomKey {
    #[must_use]
    pub fn new(platform_id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            platform_id: platform_id.into(),
            room_id: room_id.into(),
        }
    }
}

impl std::fmt::Display for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.platform_id, self.room_id)
    }
}

/// A selectable quality tier for a room's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    /// Quality id used by the platform API
    pub id: String,
    /// Display name (e.g., "1080P", "720P")
    pub name: String,
    /// Ranking weight, higher is better
    pub priority: i32,
}

/// A resolved stream endpoint with its display label.
///
/// Platforms return bare endpoint strings; the player labels them by
/// position ("Line 1", "Line 2", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveUrl {
    pub name: String,
    pub url: String,
}

/// Intrinsic size of the decoded video, reported by the sink once a frame
/// is decodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
}
