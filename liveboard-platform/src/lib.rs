// Platform boundary for LiveBoard
//
// Tier 1 of the player architecture: the data types and the `Platform`
// trait through which the player core talks to a streaming site. Platform
// implementations (HTTP clients, IPC bridges) live outside this workspace;
// this crate only fixes the contract and ships a scripted in-memory
// implementation for tests and embedders.

pub mod error;
pub mod registry;
pub mod scripted;
pub mod traits;
pub mod types;

pub use error::{PlatformError, Result};
pub use registry::PlatformRegistry;
pub use scripted::{ScriptedPlatform, ScriptedRoom};
pub use traits::Platform;
pub use types::{LiveUrl, Owner, PlatformInfo, Quality, Room, RoomKey, VideoInfo};
