// Player Slot
//
// One slot = one room rendered into one sink. The driver task owns all
// chain state and serializes every input: room snapshots from the poller,
// user commands from the handle, resolver results from spawned subtasks,
// and the overlay's hide deadline. Resolver subtasks carry the epoch they
// were issued under; results whose epoch no longer matches are discarded,
// which is what makes "latest wins" hold regardless of completion order.

use crate::attacher::StreamAttacher;
use crate::config::PlayerConfig;
use crate::engine::EngineFactory;
use crate::metadata::PlayerMetadata;
use crate::overlay::{ControlOverlay, OverlayView};
use crate::resolver::{LiveUrlResolver, QualityResolver, RoomResolver};
use crate::sink::{SinkEvent, VideoSink};
use liveboard_platform::{LiveUrl, Platform, Quality, Room, RoomKey, VideoInfo};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What the slot surface shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No room snapshot yet
    Loading,
    /// Room known and not broadcasting
    Offline,
    /// Room online; playback state lives in the metadata facade
    Playing,
}

/// Outward side effects requested from the host. Rendering aside, these
/// are the only two things a slot ever asks its surroundings to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotRequest {
    /// Apply an effective audio level to the sink (0.0 when muted)
    SetAudioLevel(f64),
    /// Enter or leave fullscreen for this slot's surface
    SetFullscreen(bool),
}

enum SlotCommand {
    PointerMoved,
    PointerLeft,
    PinEnter,
    PinExit,
    InfoEnter,
    InfoExit,
    SelectQuality(String),
    SelectLiveUrl(String),
    SetVolume(f64),
    ToggleMute,
    ToggleFullscreen,
    FullscreenReported(bool),
    Sink(SinkEvent),
}

enum ChainResult {
    Qualities { epoch: u64, list: Arc<Vec<Quality>> },
    LiveUrls { epoch: u64, list: Vec<LiveUrl> },
}

/// Factory for player slots.
pub struct PlayerSlot;

impl PlayerSlot {
    /// Spawn a slot playing `room_id` on `platform` into `sink`.
    ///
    /// Everything the slot owns (poll task, driver task, timers, the
    /// attached engine) is released by [`SlotHandle::shutdown`]; dropping
    /// the handle cancels the tasks as a fallback.
    pub fn spawn(
        platform: Arc<dyn Platform>,
        room_id: impl Into<String>,
        sink: Arc<dyn VideoSink>,
        engine_factory: Arc<dyn EngineFactory>,
        config: PlayerConfig,
    ) -> SlotHandle {
        let room_id = room_id.into();
        let meta = Arc::new(PlayerMetadata::new());
        let cancel = CancellationToken::new();

        let room_rx = RoomResolver::spawn(
            platform.clone(),
            room_id,
            config.poll.clone(),
            cancel.child_token(),
        );

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (render_tx, render_rx) = watch::channel(RenderState::Loading);

        let overlay = ControlOverlay::new(config.overlay.clone());
        let (overlay_tx, overlay_rx) = watch::channel(overlay.view(false));

        let attacher = Arc::new(StreamAttacher::new(
            sink.clone(),
            engine_factory,
            meta.clone(),
        ));

        let driver = Driver {
            meta: meta.clone(),
            sink,
            quality_resolver: Arc::new(QualityResolver::new(platform.clone())),
            live_url_resolver: Arc::new(LiveUrlResolver::new(platform)),
            attacher,
            overlay,
            render_tx,
            overlay_tx,
            requests_tx,
            results_tx,
            quality_epoch: 0,
            url_epoch: 0,
            last_url_key: None,
        };
        let driver_task = tokio::spawn(driver.run(room_rx, cmd_rx, results_rx, cancel.clone()));

        SlotHandle {
            commands: cmd_tx,
            render_rx,
            overlay_rx,
            requests_rx: Some(requests_rx),
            meta,
            cancel,
            driver: Some(driver_task),
        }
    }
}

/// Handle to a running slot.
pub struct SlotHandle {
    commands: mpsc::UnboundedSender<SlotCommand>,
    render_rx: watch::Receiver<RenderState>,
    overlay_rx: watch::Receiver<OverlayView>,
    requests_rx: Option<mpsc::UnboundedReceiver<SlotRequest>>,
    meta: Arc<PlayerMetadata>,
    cancel: CancellationToken,
    driver: Option<tokio::task::JoinHandle<()>>,
}

impl SlotHandle {
    fn send(&self, command: SlotCommand) {
        // a closed channel means the driver is already gone; commands
        // after teardown are simply dropped
        let _ = self.commands.send(command);
    }

    // ========== Pointer / overlay ==========

    pub fn pointer_moved(&self) {
        self.send(SlotCommand::PointerMoved);
    }

    pub fn pointer_left(&self) {
        self.send(SlotCommand::PointerLeft);
    }

    pub fn pin_enter(&self) {
        self.send(SlotCommand::PinEnter);
    }

    pub fn pin_exit(&self) {
        self.send(SlotCommand::PinExit);
    }

    pub fn info_enter(&self) {
        self.send(SlotCommand::InfoEnter);
    }

    pub fn info_exit(&self) {
        self.send(SlotCommand::InfoExit);
    }

    // ========== Selection ==========

    pub fn select_quality(&self, quality_id: impl Into<String>) {
        self.send(SlotCommand::SelectQuality(quality_id.into()));
    }

    pub fn select_live_url(&self, url: impl Into<String>) {
        self.send(SlotCommand::SelectLiveUrl(url.into()));
    }

    // ========== Audio / fullscreen ==========

    pub fn set_volume(&self, volume: f64) {
        self.send(SlotCommand::SetVolume(volume));
    }

    pub fn toggle_mute(&self) {
        self.send(SlotCommand::ToggleMute);
    }

    pub fn toggle_fullscreen(&self) {
        self.send(SlotCommand::ToggleFullscreen);
    }

    /// Feed the platform's fullscreen-change notification back in. This,
    /// not the toggle request, is what the overlay state tracks.
    pub fn fullscreen_reported(&self, fullscreen: bool) {
        self.send(SlotCommand::FullscreenReported(fullscreen));
    }

    // ========== Sink feedback ==========

    pub fn sink_event(&self, event: SinkEvent) {
        self.send(SlotCommand::Sink(event));
    }

    // ========== Read side ==========

    pub fn metadata(&self) -> Arc<PlayerMetadata> {
        self.meta.clone()
    }

    pub fn render_state(&self) -> watch::Receiver<RenderState> {
        self.render_rx.clone()
    }

    pub fn overlay_view(&self) -> watch::Receiver<OverlayView> {
        self.overlay_rx.clone()
    }

    /// Take the outward request stream. Yields `None` after the first
    /// call; there is exactly one consumer.
    pub fn take_requests(&mut self) -> Option<mpsc::UnboundedReceiver<SlotRequest>> {
        self.requests_rx.take()
    }

    /// Tear the slot down: stop polling, stop the driver, detach the
    /// engine. Deterministic; returns once everything is released.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for SlotHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Driver {
    meta: Arc<PlayerMetadata>,
    sink: Arc<dyn VideoSink>,
    quality_resolver: Arc<QualityResolver>,
    live_url_resolver: Arc<LiveUrlResolver>,
    attacher: Arc<StreamAttacher>,
    overlay: ControlOverlay,
    render_tx: watch::Sender<RenderState>,
    overlay_tx: watch::Sender<OverlayView>,
    requests_tx: mpsc::UnboundedSender<SlotRequest>,
    results_tx: mpsc::UnboundedSender<ChainResult>,
    quality_epoch: u64,
    url_epoch: u64,
    /// (room identity, quality id) the current line list belongs to;
    /// guards against re-resolving on every snapshot refresh
    last_url_key: Option<(RoomKey, String)>,
}

impl Driver {
    async fn run(
        mut self,
        mut room_rx: watch::Receiver<Option<Arc<Room>>>,
        mut cmd_rx: mpsc::UnboundedReceiver<SlotCommand>,
        mut results_rx: mpsc::UnboundedReceiver<ChainResult>,
        cancel: CancellationToken,
    ) {
        loop {
            let deadline = self.overlay.next_deadline();
            tokio::select! {
                () = cancel.cancelled() => break,
                changed = room_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = room_rx.borrow_and_update().clone();
                    self.on_room(snapshot).await;
                }
                Some(command) = cmd_rx.recv() => self.on_command(command).await,
                Some(result) = results_rx.recv() => self.on_chain_result(result).await,
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                        if deadline.is_some() => {
                    if self.overlay.poll(Instant::now()) {
                        self.publish_overlay();
                    }
                }
            }
        }
        // teardown: the engine is the one resource that outlives the loop
        self.attacher.detach().await;
    }

    async fn on_room(&mut self, snapshot: Option<Arc<Room>>) {
        self.meta.set_room(snapshot.clone());
        match snapshot {
            None => {
                self.render_tx.send_replace(RenderState::Loading);
            }
            Some(room) if !room.is_online => {
                debug!(room = %room.key(), "room offline");
                self.render_tx.send_replace(RenderState::Offline);
                self.quality_epoch += 1;
                self.url_epoch += 1;
                self.last_url_key = None;
                self.meta.clear_downstream();
                self.attacher.detach().await;
            }
            Some(room) => {
                self.render_tx.send_replace(RenderState::Playing);
                self.sink.set_poster(&room.cover_url);

                self.quality_epoch += 1;
                let epoch = self.quality_epoch;
                let resolver = self.quality_resolver.clone();
                let results = self.results_tx.clone();
                tokio::spawn(async move {
                    let list = resolver.resolve(Some(room.as_ref())).await;
                    let _ = results.send(ChainResult::Qualities { epoch, list });
                });
            }
        }
    }

    async fn on_chain_result(&mut self, result: ChainResult) {
        match result {
            ChainResult::Qualities { epoch, list } => {
                if epoch != self.quality_epoch {
                    debug!("discarding stale quality result");
                    return;
                }
                let selected = self.meta.set_qualities(list);
                self.resolve_urls_for(selected).await;
            }
            ChainResult::LiveUrls { epoch, list } => {
                if epoch != self.url_epoch {
                    debug!("discarding stale live-url result");
                    return;
                }
                let selected = self.meta.set_live_urls(list);
                self.apply_url_selection(selected).await;
            }
        }
    }

    /// Kick url resolution for the effective quality selection, unless the
    /// current line list already belongs to it.
    async fn resolve_urls_for(&mut self, selected_quality: Option<String>) {
        let room = self.meta.room().filter(|r| r.is_online);
        let (Some(room), Some(quality_id)) = (room, selected_quality) else {
            self.last_url_key = None;
            self.url_epoch += 1;
            self.meta.set_live_urls(Vec::new());
            self.attacher.detach().await;
            return;
        };

        let key = (room.key(), quality_id.clone());
        if self.last_url_key.as_ref() == Some(&key) && self.attacher.is_attached() {
            return;
        }
        self.last_url_key = Some(key);

        self.url_epoch += 1;
        let epoch = self.url_epoch;
        let resolver = self.live_url_resolver.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let list = resolver
                .resolve(Some(room.as_ref()), Some(quality_id.as_str()))
                .await;
            let _ = results.send(ChainResult::LiveUrls { epoch, list });
        });
    }

    async fn apply_url_selection(&mut self, selected: Option<LiveUrl>) {
        match selected {
            Some(live_url) => {
                let attacher = self.attacher.clone();
                tokio::spawn(async move {
                    if let Err(e) = attacher.attach(&live_url.url).await {
                        debug!(url = %live_url.url, error = %e, "attach did not complete");
                    }
                });
            }
            None => self.attacher.detach().await,
        }
    }

    async fn on_command(&mut self, command: SlotCommand) {
        match command {
            SlotCommand::PointerMoved => {
                self.overlay.pointer_moved(Instant::now());
                self.publish_overlay();
            }
            SlotCommand::PointerLeft => {
                self.overlay.pointer_left();
                self.publish_overlay();
            }
            SlotCommand::PinEnter => {
                self.overlay.pin_enter();
                self.publish_overlay();
            }
            SlotCommand::PinExit => {
                self.overlay.pin_exit(Instant::now());
                self.publish_overlay();
            }
            SlotCommand::InfoEnter => {
                self.overlay.info_enter();
                self.publish_overlay();
            }
            SlotCommand::InfoExit => {
                self.overlay.info_exit();
                self.publish_overlay();
            }
            SlotCommand::SelectQuality(id) => {
                let selected = self.meta.select_quality(&id);
                self.resolve_urls_for(selected).await;
            }
            SlotCommand::SelectLiveUrl(url) => {
                // ignore selections not in the current list
                if let Some(live_url) = self.meta.select_live_url(&url) {
                    if live_url.url == url {
                        self.apply_url_selection(Some(live_url)).await;
                    }
                }
            }
            SlotCommand::SetVolume(volume) => {
                let level = self.overlay.set_volume(volume);
                let _ = self.requests_tx.send(SlotRequest::SetAudioLevel(level));
                self.publish_overlay();
            }
            SlotCommand::ToggleMute => {
                let level = self.overlay.toggle_mute();
                let _ = self.requests_tx.send(SlotRequest::SetAudioLevel(level));
                self.publish_overlay();
            }
            SlotCommand::ToggleFullscreen => {
                let target = self.overlay.fullscreen_toggle_target();
                let _ = self.requests_tx.send(SlotRequest::SetFullscreen(target));
            }
            SlotCommand::FullscreenReported(fullscreen) => {
                self.overlay.set_fullscreen_reported(fullscreen);
                self.publish_overlay();
            }
            SlotCommand::Sink(event) => match event {
                SinkEvent::Waiting | SinkEvent::Playing => self.meta.end_load(),
                SinkEvent::FrameGeometry { width, height } => {
                    // a decodable frame also means loading is over
                    self.meta.set_video_info(VideoInfo { width, height });
                    self.meta.end_load();
                    self.publish_overlay();
                }
            },
        }
    }

    fn publish_overlay(&self) {
        self.overlay_tx
            .send_replace(self.overlay.view(self.meta.video_info().is_some()));
    }
}
