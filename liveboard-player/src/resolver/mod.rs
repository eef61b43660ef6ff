// Resolution chain
//
// Three strictly ordered stages turn a room reference into attachable
// endpoints: room snapshot -> quality list -> live urls. Each stage is a
// standalone resolver; ordering and stale-result discard are the slot
// driver's job.

pub mod live_url;
pub mod quality;
pub mod room;

pub use live_url::LiveUrlResolver;
pub use quality::QualityResolver;
pub use room::RoomResolver;
