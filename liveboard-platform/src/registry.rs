// Platform Registry
//
// Id-indexed lookup of platform instances. The surrounding application
// decides which platforms exist and registers them once at startup; player
// slots only ever look them up.

use crate::error::PlatformError;
use crate::traits::Platform;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of platform instances, indexed by platform id.
pub struct PlatformRegistry {
    platforms: HashMap<String, Arc<dyn Platform>>,
}

impl PlatformRegistry {
    /// Create new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            platforms: HashMap::new(),
        }
    }

    /// Register a platform instance under its own id.
    ///
    /// Registering a second instance with the same id replaces the first.
    pub fn register(&mut self, platform: Arc<dyn Platform>) {
        self.platforms.insert(platform.id().to_string(), platform);
    }

    /// Get a platform by id.
    pub fn get(&self, platform_id: &str) -> Result<Arc<dyn Platform>, PlatformError> {
        self.platforms
            .get(platform_id)
            .cloned()
            .ok_or_else(|| PlatformError::UnknownPlatform(platform_id.to_string()))
    }

    /// List all registered platform ids.
    pub fn list(&self) -> Vec<String> {
        self.platforms.keys().cloned().collect()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
