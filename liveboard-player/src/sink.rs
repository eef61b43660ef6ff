// Video Sink
//
// The host-owned rendering surface (a platform `<video>` element, a
// texture, a test double). The player only ever drives it through this
// trait; feedback flows back in as `SinkEvent`s pushed through the slot
// handle by the host.

/// The media sink a slot renders into.
///
/// Exactly one attacher writes to a sink at a time. All operations are
/// fire-and-forget from the player's point of view; the sink reports
/// progress asynchronously via [`SinkEvent`].
pub trait VideoSink: Send + Sync {
    /// Assign a directly playable source URL.
    fn set_source(&self, url: &str);

    /// Remove the current source, stopping playback.
    fn clear_source(&self);

    /// Set the poster image shown until the first decodable frame.
    fn set_poster(&self, url: &str);
}

/// Playback feedback from the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// The sink started buffering; playback is imminent.
    Waiting,
    /// The sink is rendering frames.
    Playing,
    /// Intrinsic size of the decoded video became known.
    FrameGeometry { width: u32, height: u32 },
}
