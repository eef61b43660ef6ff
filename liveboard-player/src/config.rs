// Player configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one player slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub poll: PollConfig,
    pub overlay: OverlayConfig,
}

/// Room snapshot polling.
///
/// Each poll waits a uniformly sampled interval in `[min_seconds,
/// max_seconds]`; the jitter keeps many slots on one board from hitting the
/// platform in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub min_seconds: u64,
    pub max_seconds: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            min_seconds: 30,
            max_seconds: 60,
        }
    }
}

impl PollConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_seconds)
    }

    /// Upper bound, clamped to at least `min_interval`.
    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_seconds.max(self.min_seconds))
    }
}

/// Control overlay timing and volume behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Idle time after the last pointer move before the overlay hides
    pub hide_delay_ms: u64,
    /// Volume restored by unmuting from a zero volume
    pub default_restore_volume: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            hide_delay_ms: 1000,
            default_restore_volume: 0.6,
        }
    }
}

impl OverlayConfig {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
}
