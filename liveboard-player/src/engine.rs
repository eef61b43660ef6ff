// Adaptive Streaming Engine
//
// Seam for the segmented-playback engine (the hls.js equivalent). Direct
// endpoints bypass this entirely and are assigned straight to the sink.

use crate::error::AttachError;
use crate::sink::VideoSink;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// A segmented adaptive-streaming engine instance.
///
/// Created per attach by an [`EngineFactory`], fed one manifest, bound to
/// one sink. Every created engine must see exactly one `detach` call
/// before it is dropped, whether or not `load` succeeded.
#[async_trait]
pub trait AdaptiveEngine: Send + Sync {
    /// Fetch the manifest and bind the engine's output to the sink.
    async fn load(&mut self, manifest_url: &str, sink: Arc<dyn VideoSink>)
        -> Result<(), AttachError>;

    /// Release the sink binding and all decoder resources.
    async fn detach(&mut self);
}

/// Creates engine instances, one per segmented attach.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Box<dyn AdaptiveEngine>;
}

/// How an endpoint should be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Manifest-driven playback through an [`AdaptiveEngine`]
    Segmented,
    /// URL assigned directly to the sink
    Direct,
}

impl PlaybackMode {
    /// Decide the playback mode for an endpoint.
    ///
    /// Detection is by path suffix (`.m3u8` means a segmented manifest),
    /// the same rule the upstream platforms use in their own players. A
    /// content-type probe would be more robust; if one is ever added it
    /// replaces this single call site. Endpoints that do not parse as
    /// http(s) URLs are rejected here so no decoder is ever created for
    /// them.
    pub fn detect(endpoint: &str) -> Result<Self, AttachError> {
        let parsed = Url::parse(endpoint)
            .map_err(|e| AttachError::MalformedEndpoint(format!("{endpoint}: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(AttachError::UnsupportedScheme(other.to_string())),
        }
        if parsed.path().ends_with(".m3u8") {
            Ok(Self::Segmented)
        } else {
            Ok(Self::Direct)
        }
    }
}
