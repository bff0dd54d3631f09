use serde::{Deserialize, Serialize};

/// Frame layout of a spriteset atlas, loaded from JSON.
///
/// Either lists named rectangles explicitly, describes a uniform grid, or
/// both (grid cells come first, explicit frames are appended).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpritesetManifest {
    /// Uniform grid of equally sized frames, read row by row.
    #[serde(default)]
    pub grid: Option<GridDescriptor>,
    /// Explicit named frames.
    #[serde(default)]
    pub frames: Vec<FrameDescriptor>,
}

/// Describes a uniform grid of frames covering the atlas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridDescriptor {
    /// Width of one cell in pixels.
    pub frame_width: usize,
    /// Height of one cell in pixels.
    pub frame_height: usize,
}

/// Describes one named frame inside the atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Name used by picture-by-name lookups (e.g., "walk_01").
    pub name: String,
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl SpritesetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
