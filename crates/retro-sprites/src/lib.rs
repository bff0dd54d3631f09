//! Per-sprite compositing core of a tile/sprite based 2D software raster
//! engine: sprite state, clipping, scaling, rotation and blitter selection.

pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::EngineConfig;
pub use api::engine::SpriteEngine;
pub use api::types::SpriteFlags;
pub use assets::bitmap::{Bitmap, PixelFormat, PixelView};
pub use assets::manifest::{FrameDescriptor, GridDescriptor, SpritesetManifest};
pub use assets::palette::{Color, Palette};
pub use assets::spriteset::{SpriteFrame, Spriteset};
pub use components::sprite::{Sprite, SpriteMode, SpriteRenderInfo};
pub use crate::core::error::{ErrorCode, SpriteError};
pub use crate::core::fixed::{Fix, FixVec2, ScanVector, FIX_BITS};
pub use crate::core::rect::Rect;
pub use renderer::blend::{BlendMode, BlendTable};
pub use renderer::blitter::Blitter;
pub use renderer::framebuffer::Framebuffer;
pub use systems::rotation::RotatedSurface;

#[cfg(feature = "tileset")]
pub use assets::tileset::{
    Sequence, SequenceFrame, SequencePack, TileAttributes, Tileset, TilesetDescriptor,
    TilesetError, TilesetImage,
};
