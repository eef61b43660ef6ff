// Player Metadata
//
// The single read-only aggregation point per slot. Resolvers, the
// attacher, and the slot driver write through crate-private setters;
// overlay menus and info panels read through the public accessors and
// never re-derive selection logic themselves.
//
// Selection validation lives here: a selected quality or line that is
// absent from a newly resolved list falls back to the top-ranked entry, or
// to nothing when the list is empty.

use liveboard_platform::{LiveUrl, Quality, Room, VideoInfo};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
struct MetaInner {
    room: Option<Arc<Room>>,
    qualities: Arc<Vec<Quality>>,
    selected_quality_id: Option<String>,
    live_urls: Arc<Vec<LiveUrl>>,
    selected_live_url: Option<LiveUrl>,
    video_info: Option<VideoInfo>,
    loading: bool,
}

/// Shared read-only view of one slot's resolved state.
pub struct PlayerMetadata {
    inner: RwLock<MetaInner>,
}

impl PlayerMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MetaInner::default()),
        }
    }

    // ========== Read side (public) ==========

    /// Latest room snapshot, if any resolve ever succeeded.
    pub fn room(&self) -> Option<Arc<Room>> {
        self.inner.read().room.clone()
    }

    /// Qualities ranked descending by priority.
    pub fn qualities(&self) -> Arc<Vec<Quality>> {
        self.inner.read().qualities.clone()
    }

    pub fn selected_quality(&self) -> Option<Quality> {
        let inner = self.inner.read();
        let id = inner.selected_quality_id.as_deref()?;
        inner.qualities.iter().find(|q| q.id == id).cloned()
    }

    pub fn selected_quality_id(&self) -> Option<String> {
        self.inner.read().selected_quality_id.clone()
    }

    /// Lines for the selected quality, labeled in resolution order.
    pub fn live_urls(&self) -> Arc<Vec<LiveUrl>> {
        self.inner.read().live_urls.clone()
    }

    pub fn selected_live_url(&self) -> Option<LiveUrl> {
        self.inner.read().selected_live_url.clone()
    }

    /// Intrinsic frame size, present only while the current load has
    /// reported a decodable frame.
    pub fn video_info(&self) -> Option<VideoInfo> {
        self.inner.read().video_info
    }

    /// True from the start of an attach until the sink first reports
    /// waiting/playing.
    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    // ========== Write side (crate-private) ==========

    pub(crate) fn set_room(&self, room: Option<Arc<Room>>) {
        self.inner.write().room = room;
    }

    /// Replace the quality list wholesale and re-validate the selection.
    ///
    /// Returns the effective selected quality id after fallback.
    pub(crate) fn set_qualities(&self, qualities: Arc<Vec<Quality>>) -> Option<String> {
        let mut inner = self.inner.write();
        let keep = inner
            .selected_quality_id
            .as_deref()
            .is_some_and(|id| qualities.iter().any(|q| q.id == id));
        if !keep {
            inner.selected_quality_id = qualities.first().map(|q| q.id.clone());
        }
        inner.qualities = qualities;
        inner.selected_quality_id.clone()
    }

    /// Apply a user quality selection. Ids not in the current list are
    /// ignored; returns the selection actually in effect.
    pub(crate) fn select_quality(&self, id: &str) -> Option<String> {
        let mut inner = self.inner.write();
        if inner.qualities.iter().any(|q| q.id == id) {
            inner.selected_quality_id = Some(id.to_string());
        }
        inner.selected_quality_id.clone()
    }

    /// Replace the line list wholesale and re-validate the selection.
    pub(crate) fn set_live_urls(&self, live_urls: Vec<LiveUrl>) -> Option<LiveUrl> {
        let mut inner = self.inner.write();
        let keep = inner
            .selected_live_url
            .as_ref()
            .is_some_and(|sel| live_urls.iter().any(|u| u.url == sel.url));
        if !keep {
            inner.selected_live_url = live_urls.first().cloned();
        }
        inner.live_urls = Arc::new(live_urls);
        inner.selected_live_url.clone()
    }

    /// Apply a user line selection. Unknown urls are ignored.
    pub(crate) fn select_live_url(&self, url: &str) -> Option<LiveUrl> {
        let mut inner = self.inner.write();
        if let Some(found) = inner.live_urls.iter().find(|u| u.url == url).cloned() {
            inner.selected_live_url = Some(found);
        }
        inner.selected_live_url.clone()
    }

    /// Drop everything downstream of the room snapshot (offline/unknown
    /// rooms have no qualities, lines, or playback state).
    pub(crate) fn clear_downstream(&self) {
        let mut inner = self.inner.write();
        inner.qualities = Arc::new(Vec::new());
        inner.selected_quality_id = None;
        inner.live_urls = Arc::new(Vec::new());
        inner.selected_live_url = None;
        inner.video_info = None;
        inner.loading = false;
    }

    /// A fresh load is starting: loading on, stale frame geometry gone.
    pub(crate) fn begin_load(&self) {
        let mut inner = self.inner.write();
        inner.loading = true;
        inner.video_info = None;
    }

    /// The sink reported waiting/playing for the current load.
    pub(crate) fn end_load(&self) {
        self.inner.write().loading = false;
    }

    /// Nothing is attached (failed or cleared attach).
    pub(crate) fn reset_playback(&self) {
        let mut inner = self.inner.write();
        inner.loading = false;
        inner.video_info = None;
    }

    pub(crate) fn set_video_info(&self, info: VideoInfo) {
        self.inner.write().video_info = Some(info);
    }
}

impl Default for PlayerMetadata {
    fn default() -> Self {
        Self::new()
    }
}
