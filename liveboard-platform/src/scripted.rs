// Scripted Platform
//
// In-memory `Platform` backed by mutable fixtures. Used by the player's
// tests and by embedders that need a deterministic platform (demos, UI
// development without network access). Counts every boundary call so tests
// can assert which resolutions actually hit the platform.

use crate::error::PlatformError;
use crate::traits::Platform;
use crate::types::{Owner, PlatformInfo, Quality, Room};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Fixture for one room: the snapshot plus everything the platform would
/// resolve for it.
#[derive(Debug, Clone)]
pub struct ScriptedRoom {
    pub room: Room,
    /// Qualities in platform order (pre-sort)
    pub qualities: Vec<Quality>,
    /// quality id -> raw endpoint strings
    pub urls: HashMap<String, Vec<String>>,
    /// quality id -> artificial latency before the url response
    pub url_delays: HashMap<String, Duration>,
}

impl ScriptedRoom {
    /// Fixture with a minimal room snapshot and no qualities or urls.
    #[must_use]
    pub fn new(platform_id: &str, room_id: &str, is_online: bool) -> Self {
        Self {
            room: Room {
                id: room_id.to_string(),
                title: format!("room {room_id}"),
                owner: Owner {
                    id: format!("owner-{room_id}"),
                    name: format!("owner of {room_id}"),
                    avatar_url: String::new(),
                },
                is_online,
                cover_url: String::new(),
                platform: PlatformInfo {
                    id: platform_id.to_string(),
                    name: platform_id.to_string(),
                    icon_url: String::new(),
                },
            },
            qualities: Vec::new(),
            urls: HashMap::new(),
            url_delays: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_quality(mut self, id: &str, name: &str, priority: i32) -> Self {
        self.qualities.push(Quality {
            id: id.to_string(),
            name: name.to_string(),
            priority,
        });
        self
    }

    #[must_use]
    pub fn with_urls(mut self, quality_id: &str, urls: &[&str]) -> Self {
        self.urls.insert(
            quality_id.to_string(),
            urls.iter().map(|u| (*u).to_string()).collect(),
        );
        self
    }
}

/// Deterministic in-memory platform.
pub struct ScriptedPlatform {
    id: String,
    rooms: Mutex<HashMap<String, ScriptedRoom>>,
    fail_rooms: AtomicBool,
    room_calls: AtomicUsize,
    quality_calls: AtomicUsize,
    url_calls: AtomicUsize,
}

impl ScriptedPlatform {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rooms: Mutex::new(HashMap::new()),
            fail_rooms: AtomicBool::new(false),
            room_calls: AtomicUsize::new(0),
            quality_calls: AtomicUsize::new(0),
            url_calls: AtomicUsize::new(0),
        }
    }

    /// Insert or replace a room fixture.
    pub fn put_room(&self, fixture: ScriptedRoom) {
        self.rooms.lock().insert(fixture.room.id.clone(), fixture);
    }

    /// Flip a room's online state in place (next `get_room` sees it).
    pub fn set_online(&self, room_id: &str, is_online: bool) {
        if let Some(fixture) = self.rooms.lock().get_mut(room_id) {
            fixture.room.is_online = is_online;
        }
    }

    /// Replace a room's quality list.
    pub fn set_qualities(&self, room_id: &str, qualities: Vec<Quality>) {
        if let Some(fixture) = self.rooms.lock().get_mut(room_id) {
            fixture.qualities = qualities;
        }
    }

    /// Replace the endpoints for one quality of a room.
    pub fn set_urls(&self, room_id: &str, quality_id: &str, urls: Vec<String>) {
        if let Some(fixture) = self.rooms.lock().get_mut(room_id) {
            fixture.urls.insert(quality_id.to_string(), urls);
        }
    }

    /// Delay url resolution for one quality, so tests can interleave a
    /// selection change with an in-flight resolve.
    pub fn set_url_delay(&self, room_id: &str, quality_id: &str, delay: Duration) {
        if let Some(fixture) = self.rooms.lock().get_mut(room_id) {
            fixture.url_delays.insert(quality_id.to_string(), delay);
        }
    }

    /// Make every `get_room` fail with a network error until cleared.
    pub fn set_room_failure(&self, fail: bool) {
        self.fail_rooms.store(fail, Ordering::SeqCst);
    }

    pub fn room_calls(&self) -> usize {
        self.room_calls.load(Ordering::SeqCst)
    }

    pub fn quality_calls(&self) -> usize {
        self.quality_calls.load(Ordering::SeqCst)
    }

    pub fn url_calls(&self) -> usize {
        self.url_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for ScriptedPlatform {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, PlatformError> {
        self.room_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rooms.load(Ordering::SeqCst) {
            return Err(PlatformError::NetworkError("scripted failure".to_string()));
        }
        Ok(self.rooms.lock().get(room_id).map(|f| f.room.clone()))
    }

    async fn get_qualities(&self, room_id: &str) -> Result<Vec<Quality>, PlatformError> {
        self.quality_calls.fetch_add(1, Ordering::SeqCst);
        self.rooms
            .lock()
            .get(room_id)
            .map(|f| f.qualities.clone())
            .ok_or(PlatformError::NotFound)
    }

    async fn get_live_urls(
        &self,
        room_id: &str,
        quality_id: &str,
    ) -> Result<Vec<String>, PlatformError> {
        self.url_calls.fetch_add(1, Ordering::SeqCst);
        let (urls, delay) = {
            let rooms = self.rooms.lock();
            let fixture = rooms.get(room_id).ok_or(PlatformError::NotFound)?;
            (
                fixture.urls.get(quality_id).cloned().unwrap_or_default(),
                fixture.url_delays.get(quality_id).copied(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(urls)
    }
}
