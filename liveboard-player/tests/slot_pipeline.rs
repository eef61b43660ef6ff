// End-to-end slot scenarios against a scripted platform, a counting sink,
// and a counting engine factory, all on paused virtual time.

use async_trait::async_trait;
use liveboard_platform::{ScriptedPlatform, ScriptedRoom};
use liveboard_player::{
    AdaptiveEngine, AttachError, EngineFactory, PlayerConfig, PlayerSlot, RenderState, SinkEvent,
    SlotRequest, VideoSink,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct RecordingSink {
    sources: Mutex<Vec<String>>,
    posters: Mutex<Vec<String>>,
    clears: AtomicUsize,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sources: Mutex::new(Vec::new()),
            posters: Mutex::new(Vec::new()),
            clears: AtomicUsize::new(0),
        })
    }
}

impl VideoSink for RecordingSink {
    fn set_source(&self, url: &str) {
        self.sources.lock().push(url.to_string());
    }

    fn clear_source(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }

    fn set_poster(&self, url: &str) {
        self.posters.lock().push(url.to_string());
    }
}

#[derive(Default)]
struct EngineLog {
    created: AtomicUsize,
    detached: AtomicUsize,
    active: AtomicUsize,
    loads: Mutex<Vec<String>>,
}

struct RecordingEngine {
    log: Arc<EngineLog>,
    loaded: bool,
}

#[async_trait]
impl AdaptiveEngine for RecordingEngine {
    async fn load(
        &mut self,
        manifest_url: &str,
        _sink: Arc<dyn VideoSink>,
    ) -> Result<(), AttachError> {
        self.log.loads.lock().push(manifest_url.to_string());
        self.loaded = true;
        let active = self.log.active.fetch_add(1, Ordering::SeqCst) + 1;
        assert_eq!(active, 1, "two engines active on one sink");
        Ok(())
    }

    async fn detach(&mut self) {
        self.log.detached.fetch_add(1, Ordering::SeqCst);
        if self.loaded {
            self.log.active.fetch_sub(1, Ordering::SeqCst);
            self.loaded = false;
        }
    }
}

struct RecordingFactory {
    log: Arc<EngineLog>,
}

impl EngineFactory for RecordingFactory {
    fn create(&self) -> Box<dyn AdaptiveEngine> {
        self.log.created.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingEngine {
            log: self.log.clone(),
            loaded: false,
        })
    }
}

struct Fixture {
    platform: Arc<ScriptedPlatform>,
    sink: Arc<RecordingSink>,
    log: Arc<EngineLog>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            platform: Arc::new(ScriptedPlatform::new("bili")),
            sink: RecordingSink::new(),
            log: Arc::new(EngineLog::default()),
        }
    }

    fn spawn(&self, room_id: &str) -> liveboard_player::SlotHandle {
        PlayerSlot::spawn(
            self.platform.clone(),
            room_id,
            self.sink.clone(),
            Arc::new(RecordingFactory {
                log: self.log.clone(),
            }),
            PlayerConfig::default(),
        )
    }
}

async fn settle() {
    // paused clock: 1ms hops drain all ready tasks between assertions
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_online_room_plays_top_quality_first_line() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("sd", "480P", 1)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/hd1.flv", "https://cdn/hd2.flv"])
            .with_urls("sd", &["https://cdn/sd1.flv"]),
    );

    let handle = fixture.spawn("1");
    settle().await;

    assert_eq!(*handle.render_state().borrow(), RenderState::Playing);
    let meta = handle.metadata();
    assert_eq!(meta.selected_quality().expect("selected").id, "hd");
    assert_eq!(
        meta.selected_live_url().expect("selected").url,
        "https://cdn/hd1.flv"
    );
    assert_eq!(meta.live_urls()[0].name, "Line 1");
    assert_eq!(
        *fixture.sink.sources.lock(),
        vec!["https://cdn/hd1.flv".to_string()]
    );
    // poster comes from the room cover before playback starts
    assert_eq!(fixture.sink.posters.lock().len(), 1);
    assert!(meta.is_loading());

    // sink feedback ends the loading phase and carries frame geometry
    handle.sink_event(SinkEvent::Playing);
    handle.sink_event(SinkEvent::FrameGeometry {
        width: 1920,
        height: 1080,
    });
    settle().await;
    assert!(!meta.is_loading());
    assert_eq!(meta.video_info().expect("info").height, 1080);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_offline_room_skips_downstream_resolution() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", false)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/hd1.flv"]),
    );

    let handle = fixture.spawn("1");
    settle().await;

    assert_eq!(*handle.render_state().borrow(), RenderState::Offline);
    assert_eq!(fixture.platform.quality_calls(), 0);
    assert_eq!(fixture.platform.url_calls(), 0);
    assert!(fixture.sink.sources.lock().is_empty());
    assert_eq!(fixture.log.created.load(Ordering::SeqCst), 0);
    assert!(!handle.metadata().is_loading());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_manifest_endpoint_goes_through_engine() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/x/index.m3u8"]),
    );

    let handle = fixture.spawn("1");
    settle().await;

    assert_eq!(fixture.log.created.load(Ordering::SeqCst), 1);
    assert_eq!(
        *fixture.log.loads.lock(),
        vec!["https://cdn/x/index.m3u8".to_string()]
    );
    // segmented playback never assigns the sink source directly
    assert!(fixture.sink.sources.lock().is_empty());

    handle.shutdown().await;
    assert_eq!(fixture.log.active.load(Ordering::SeqCst), 0);
    assert_eq!(
        fixture.log.created.load(Ordering::SeqCst),
        fixture.log.detached.load(Ordering::SeqCst)
    );
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_endpoint_renders_neutral() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["rtmp://live/app/stream"]),
    );

    let handle = fixture.spawn("1");
    settle().await;

    assert!(fixture.sink.sources.lock().is_empty());
    assert_eq!(fixture.log.created.load(Ordering::SeqCst), 0);
    assert!(!handle.metadata().is_loading());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_url_result_for_old_quality_discarded() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("a", "A", 10)
            .with_quality("b", "B", 5)
            .with_urls("a", &["https://cdn/a1.flv"])
            .with_urls("b", &["https://cdn/b1.flv"]),
    );
    // default selection is "a"; its url resolution stalls
    fixture
        .platform
        .set_url_delay("1", "a", Duration::from_secs(5));

    let handle = fixture.spawn("1");
    settle().await;
    assert_eq!(
        handle.metadata().selected_quality().expect("selected").id,
        "a"
    );
    assert!(fixture.sink.sources.lock().is_empty());

    // switch to "b" while a's resolve is still in flight
    handle.select_quality("b");
    settle().await;
    assert_eq!(
        *fixture.sink.sources.lock(),
        vec!["https://cdn/b1.flv".to_string()]
    );

    // a's late result arrives and must be discarded
    tokio::time::advance(Duration::from_secs(6)).await;
    settle().await;
    assert_eq!(
        *fixture.sink.sources.lock(),
        vec!["https://cdn/b1.flv".to_string()]
    );
    assert_eq!(
        handle.metadata().selected_live_url().expect("selected").url,
        "https://cdn/b1.flv"
    );

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_line_switch_detaches_previous_source() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/hd1.flv", "https://cdn/hd2.flv"]),
    );

    let handle = fixture.spawn("1");
    settle().await;

    handle.select_live_url("https://cdn/hd2.flv");
    settle().await;

    assert_eq!(
        *fixture.sink.sources.lock(),
        vec![
            "https://cdn/hd1.flv".to_string(),
            "https://cdn/hd2.flv".to_string()
        ]
    );
    assert_eq!(fixture.sink.clears.load(Ordering::SeqCst), 1);
    assert_eq!(
        handle.metadata().selected_live_url().expect("selected").url,
        "https://cdn/hd2.flv"
    );

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_room_going_offline_detaches_engine() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/x/index.m3u8"]),
    );

    let handle = fixture.spawn("1");
    settle().await;
    assert_eq!(fixture.log.active.load(Ordering::SeqCst), 1);

    fixture.platform.set_online("1", false);
    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;

    assert_eq!(*handle.render_state().borrow(), RenderState::Offline);
    assert_eq!(fixture.log.active.load(Ordering::SeqCst), 0);
    assert!(handle.metadata().qualities().is_empty());
    assert!(handle.metadata().selected_quality().is_none());

    handle.shutdown().await;
    assert_eq!(
        fixture.log.created.load(Ordering::SeqCst),
        fixture.log.detached.load(Ordering::SeqCst)
    );
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_refresh_does_not_churn_attachment() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/hd1.flv"]),
    );

    let handle = fixture.spawn("1");
    settle().await;
    assert_eq!(fixture.sink.sources.lock().len(), 1);

    // several poll refreshes of the same identity
    tokio::time::advance(Duration::from_secs(200)).await;
    settle().await;
    assert!(fixture.platform.room_calls() >= 3);

    // quality list cached per identity, attachment untouched
    assert_eq!(fixture.platform.quality_calls(), 1);
    assert_eq!(fixture.platform.url_calls(), 1);
    assert_eq!(fixture.sink.sources.lock().len(), 1);
    assert_eq!(fixture.sink.clears.load(Ordering::SeqCst), 0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_poller_and_engine() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/x/index.m3u8"]),
    );

    let handle = fixture.spawn("1");
    settle().await;
    assert_eq!(fixture.log.active.load(Ordering::SeqCst), 1);

    handle.shutdown().await;
    let calls_after_shutdown = fixture.platform.room_calls();

    assert_eq!(fixture.log.active.load(Ordering::SeqCst), 0);
    assert_eq!(
        fixture.log.created.load(Ordering::SeqCst),
        fixture.log.detached.load(Ordering::SeqCst)
    );

    // no polling survives teardown
    tokio::time::advance(Duration::from_secs(600)).await;
    settle().await;
    assert_eq!(fixture.platform.room_calls(), calls_after_shutdown);
}

#[tokio::test(start_paused = true)]
async fn test_volume_and_fullscreen_requests() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/hd1.flv"]),
    );

    let mut handle = fixture.spawn("1");
    let mut requests = handle.take_requests().expect("first take");
    assert!(handle.take_requests().is_none());
    settle().await;

    handle.set_volume(0.4);
    settle().await;
    assert_eq!(
        requests.try_recv().expect("request"),
        SlotRequest::SetAudioLevel(0.4)
    );

    handle.toggle_mute();
    settle().await;
    assert_eq!(
        requests.try_recv().expect("request"),
        SlotRequest::SetAudioLevel(0.0)
    );

    handle.toggle_fullscreen();
    settle().await;
    assert_eq!(
        requests.try_recv().expect("request"),
        SlotRequest::SetFullscreen(true)
    );

    // the overlay tracks the report, not the request
    handle.fullscreen_reported(true);
    handle.toggle_fullscreen();
    settle().await;
    assert_eq!(
        requests.try_recv().expect("request"),
        SlotRequest::SetFullscreen(false)
    );

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_overlay_auto_hide_through_slot() {
    let fixture = Fixture::new();
    fixture.platform.put_room(
        ScriptedRoom::new("bili", "1", true)
            .with_quality("hd", "1080P", 10)
            .with_urls("hd", &["https://cdn/hd1.flv"]),
    );

    let handle = fixture.spawn("1");
    let overlay = handle.overlay_view();
    settle().await;
    assert!(!overlay.borrow().visible);

    handle.pointer_moved();
    settle().await;
    assert!(overlay.borrow().visible);

    tokio::time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert!(!overlay.borrow().visible);

    // a pinned region holds the overlay open past the idle threshold
    handle.pointer_moved();
    handle.pin_enter();
    settle().await;
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert!(overlay.borrow().visible);

    handle.pin_exit();
    settle().await;
    tokio::time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert!(!overlay.borrow().visible);

    handle.shutdown().await;
}
