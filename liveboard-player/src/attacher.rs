// Stream Attacher
//
// Owns the decoder/sink binding for one slot. At most one engine (or one
// direct source assignment) exists at a time; every attach releases the
// previous binding before creating the next, and every attach carries an
// epoch so an in-flight attach that lost the race discards its own engine
// instead of clobbering its successor.

use crate::engine::{AdaptiveEngine, EngineFactory, PlaybackMode};
use crate::error::AttachError;
use crate::metadata::PlayerMetadata;
use crate::sink::VideoSink;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Attachment lifecycle of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    Idle,
    Attaching,
    Attached,
    Detaching,
}

struct Inner {
    state: AttachState,
    engine: Option<Box<dyn AdaptiveEngine>>,
    direct: bool,
}

pub struct StreamAttacher {
    sink: Arc<dyn VideoSink>,
    factory: Arc<dyn EngineFactory>,
    meta: Arc<PlayerMetadata>,
    /// Fencing token: bumped at attach issue time and on detach, checked
    /// again after every suspension point.
    epoch: AtomicU64,
    attached: AtomicBool,
    inner: Mutex<Inner>,
}

impl StreamAttacher {
    #[must_use]
    pub fn new(
        sink: Arc<dyn VideoSink>,
        factory: Arc<dyn EngineFactory>,
        meta: Arc<PlayerMetadata>,
    ) -> Self {
        Self {
            sink,
            factory,
            meta,
            epoch: AtomicU64::new(0),
            attached: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                state: AttachState::Idle,
                engine: None,
                direct: false,
            }),
        }
    }

    /// Attach a resolved endpoint, releasing whatever was attached before.
    ///
    /// Segmented manifests (`.m3u8` path) go through a fresh engine from
    /// the factory; anything else is assigned to the sink directly. An
    /// endpoint that cannot be played detaches the previous binding and
    /// leaves the slot in its neutral state with the loading flag off.
    pub async fn attach(&self, endpoint: &str) -> Result<(), AttachError> {
        let my_epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let mode = match PlaybackMode::detect(endpoint) {
            Ok(mode) => mode,
            Err(e) => {
                warn!(endpoint, error = %e, "unplayable endpoint, staying unattached");
                let mut inner = self.inner.lock().await;
                if self.epoch.load(Ordering::SeqCst) != my_epoch {
                    return Err(AttachError::Superseded);
                }
                self.release(&mut inner).await;
                self.meta.reset_playback();
                return Err(e);
            }
        };

        let mut inner = self.inner.lock().await;
        if self.epoch.load(Ordering::SeqCst) != my_epoch {
            // a newer attach was issued while this one waited for the lock
            return Err(AttachError::Superseded);
        }

        self.release(&mut inner).await;
        self.meta.begin_load();

        match mode {
            PlaybackMode::Direct => {
                self.sink.set_source(endpoint);
                inner.state = AttachState::Attached;
                inner.direct = true;
                self.attached.store(true, Ordering::SeqCst);
                debug!(endpoint, "attached direct source");
            }
            PlaybackMode::Segmented => {
                inner.state = AttachState::Attaching;
                let mut engine = self.factory.create();
                match engine.load(endpoint, self.sink.clone()).await {
                    Ok(()) => {
                        if self.epoch.load(Ordering::SeqCst) != my_epoch {
                            // superseded during manifest load: this attach
                            // owns its engine and must release it itself
                            engine.detach().await;
                            return Err(AttachError::Superseded);
                        }
                        inner.engine = Some(engine);
                        inner.state = AttachState::Attached;
                        self.attached.store(true, Ordering::SeqCst);
                        debug!(endpoint, "attached segmented engine");
                    }
                    Err(e) => {
                        engine.detach().await;
                        inner.state = AttachState::Idle;
                        self.meta.reset_playback();
                        warn!(endpoint, error = %e, "engine load failed");
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    /// Release the current binding and invalidate any in-flight attach.
    pub async fn detach(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().await;
        self.release(&mut inner).await;
        self.meta.reset_playback();
    }

    /// True while an engine or direct source is installed.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    pub async fn state(&self) -> AttachState {
        self.inner.lock().await.state
    }

    async fn release(&self, inner: &mut Inner) {
        let had_direct = std::mem::take(&mut inner.direct);
        let engine = inner.engine.take();
        let had_engine = engine.is_some();
        if let Some(mut engine) = engine {
            inner.state = AttachState::Detaching;
            engine.detach().await;
        }
        if had_engine || had_direct {
            self.sink.clear_source();
        }
        inner.state = AttachState::Idle;
        self.attached.store(false, Ordering::SeqCst);
    }
}
