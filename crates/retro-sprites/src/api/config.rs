use serde::{Deserialize, Serialize};

use crate::core::rect::Rect;

/// Engine configuration, fixed for the engine's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Framebuffer width in pixels (default: 256).
    pub width: u32,
    /// Framebuffer height in pixels (default: 224).
    pub height: u32,
    /// Number of sprite slots (default: 64).
    pub num_sprites: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 224,
            num_sprites: 64,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Framebuffer rectangle that sprites are clipped against.
    pub fn screen_rect(&self) -> Rect {
        let w = i32::try_from(self.width).unwrap_or(i32::MAX);
        let h = i32::try_from(self.height).unwrap_or(i32::MAX);
        Rect::from_size(0, 0, w, h)
    }
}
