// LiveBoard player core
//
// Everything that happens inside one player slot: the room -> quality ->
// live-url resolution chain, the stream attacher that owns the decoding
// engine, the control overlay state machine, and the slot driver tying
// them together. Multiple slots run independently; nothing in this crate
// is shared between slots.

pub mod attacher;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod overlay;
pub mod resolver;
pub mod sink;
pub mod slot;

pub use attacher::{AttachState, StreamAttacher};
pub use config::{OverlayConfig, PlayerConfig, PollConfig};
pub use engine::{AdaptiveEngine, EngineFactory, PlaybackMode};
pub use error::AttachError;
pub use logging::{init_logging, LoggingConfig};
pub use metadata::PlayerMetadata;
pub use overlay::{ControlOverlay, OverlayView};
pub use resolver::{LiveUrlResolver, QualityResolver, RoomResolver};
pub use sink::{SinkEvent, VideoSink};
pub use slot::{PlayerSlot, RenderState, SlotHandle, SlotRequest};
