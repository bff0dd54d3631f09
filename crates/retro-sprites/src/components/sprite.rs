//! Per-slot sprite state.
//!
//! A [`Sprite`] is mutated only through [`SpriteEngine`](crate::SpriteEngine)
//! so that its rectangles, step and blitter are always consistent with the
//! last call. Read access is public for the render loop.

use std::rc::Rc;

use glam::{IVec2, Vec2};

use crate::api::types::SpriteFlags;
use crate::assets::bitmap::{Bitmap, PixelFormat, PixelView};
use crate::assets::palette::Palette;
use crate::assets::spriteset::Spriteset;
use crate::core::fixed::{Fix, FixVec2};
use crate::core::rect::Rect;
use crate::renderer::blend::{BlendMode, BlendTable};
use crate::renderer::blitter::Blitter;
use crate::systems::rotation::RotatedSurface;

/// Drawing mode of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpriteMode {
    #[default]
    Normal,
    Scaling,
    /// Drawn from a pre-rotated surface.
    Transform,
}

/// Mode plus the storage only that mode owns; a rotation surface exists
/// exactly while the sprite is in `Transform` mode.
#[derive(Debug, Default)]
pub(crate) enum ModeState {
    #[default]
    Normal,
    Scaling,
    Transform(RotatedSurface),
}

impl ModeState {
    pub(crate) fn mode(&self) -> SpriteMode {
        match self {
            ModeState::Normal => SpriteMode::Normal,
            ModeState::Scaling => SpriteMode::Scaling,
            ModeState::Transform(_) => SpriteMode::Transform,
        }
    }
}

/// Everything the render loop needs to blit one sprite, without
/// re-deriving geometry.
#[derive(Debug, Clone, Copy)]
pub struct SpriteRenderInfo<'a> {
    /// Source rectangle inside `pixels`, in fixed point.
    pub srcrect: Rect<Fix>,
    /// Clipped destination rectangle on the framebuffer.
    pub dstrect: Rect<i32>,
    /// Source advance per destination pixel.
    pub step: FixVec2,
    /// Bitmap that `pixels` was cut from.
    pub bitmap: &'a Bitmap,
    /// Unclipped source image (current frame or rotation surface).
    pub pixels: PixelView,
    pub blitter: Blitter,
    pub flags: SpriteFlags,
    /// Color table; absent only for `Rgba32` sources.
    pub palette: Option<&'a Palette>,
    pub blend: Option<&'a BlendTable>,
}

/// One hardware-sprite slot.
#[derive(Debug)]
pub struct Sprite {
    pub(crate) spriteset: Option<Rc<Spriteset>>,
    pub(crate) palette: Option<Rc<Palette>>,
    pub(crate) picture: usize,
    /// View of the current frame inside the spriteset bitmap.
    pub(crate) pixels: Option<PixelView>,
    pub(crate) pos: IVec2,
    pub(crate) flags: SpriteFlags,
    pub(crate) scale: Vec2,
    pub(crate) mode: ModeState,
    pub(crate) srcrect: Rect<Fix>,
    pub(crate) dstrect: Rect<i32>,
    pub(crate) step: FixVec2,
    pub(crate) blend_mode: BlendMode,
    pub(crate) blend: Option<Rc<BlendTable>>,
    pub(crate) blitter: Blitter,
    pub(crate) do_collision: bool,
    pub(crate) collision: bool,
    pub(crate) ok: bool,
}

impl Sprite {
    pub fn new() -> Self {
        Self {
            spriteset: None,
            palette: None,
            picture: 0,
            pixels: None,
            pos: IVec2::ZERO,
            flags: SpriteFlags::NONE,
            scale: Vec2::ONE,
            mode: ModeState::Normal,
            srcrect: Rect::default(),
            dstrect: Rect::default(),
            step: FixVec2::ONE,
            blend_mode: BlendMode::None,
            blend: None,
            blitter: Blitter::default(),
            do_collision: false,
            collision: false,
            ok: false,
        }
    }

    pub fn spriteset(&self) -> Option<&Rc<Spriteset>> {
        self.spriteset.as_ref()
    }

    pub fn palette(&self) -> Option<&Rc<Palette>> {
        self.palette.as_ref()
    }

    /// Index of the assigned frame.
    pub fn picture(&self) -> usize {
        self.picture
    }

    pub fn position(&self) -> IVec2 {
        self.pos
    }

    pub fn flags(&self) -> SpriteFlags {
        self.flags
    }

    /// Scale factors; `(1.0, 1.0)` unless scaling is active.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn mode(&self) -> SpriteMode {
        self.mode.mode()
    }

    pub fn srcrect(&self) -> Rect<Fix> {
        self.srcrect
    }

    pub fn dstrect(&self) -> Rect<i32> {
        self.dstrect
    }

    /// Source-to-destination step per axis.
    pub fn step(&self) -> FixVec2 {
        self.step
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn blitter(&self) -> Blitter {
        self.blitter
    }

    pub fn collision_enabled(&self) -> bool {
        self.do_collision
    }

    pub fn collision(&self) -> bool {
        self.collision
    }

    /// True once a spriteset (and, for indexed spritesets, a palette) is
    /// assigned and the sprite has not been disabled since.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Pre-rotated surface, present only in `Transform` mode.
    pub fn rotation_surface(&self) -> Option<&RotatedSurface> {
        match &self.mode {
            ModeState::Transform(surface) => Some(surface),
            _ => None,
        }
    }

    /// Size of the current frame in pixels.
    pub fn frame_size(&self) -> Option<IVec2> {
        self.pixels
            .map(|v| IVec2::new(v.width as i32, v.height as i32))
    }

    /// Pixel format the blitter must read.
    pub(crate) fn source_format(&self) -> PixelFormat {
        self.spriteset
            .as_ref()
            .map(|s| s.format())
            .unwrap_or_default()
    }

    pub(crate) fn refresh_ok(&mut self) {
        self.ok = match &self.spriteset {
            Some(set) => self.palette.is_some() || set.format() == PixelFormat::Rgba32,
            None => false,
        };
    }

    /// Re-resolve the drawing routine from format, flip, mode and blend.
    pub(crate) fn select_blitter(&mut self) {
        let scaling = self.mode() == SpriteMode::Scaling;
        self.blitter = Blitter::select(
            self.source_format(),
            self.flags.flip_x(),
            scaling,
            self.blend.is_some(),
        );
    }

    /// Published render interface; `None` for disabled sprites.
    pub fn render_info(&self) -> Option<SpriteRenderInfo<'_>> {
        if !self.ok {
            return None;
        }
        let (bitmap, pixels) = match &self.mode {
            ModeState::Transform(surface) => (surface.bitmap(), surface.bitmap().full_view()),
            _ => (self.spriteset.as_deref()?.bitmap(), self.pixels?),
        };
        Some(SpriteRenderInfo {
            srcrect: self.srcrect,
            dstrect: self.dstrect,
            step: self.step,
            bitmap,
            pixels,
            blitter: self.blitter,
            flags: self.flags,
            palette: self.palette.as_deref(),
            blend: self.blend.as_deref(),
        })
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sprite_is_disabled_normal() {
        let s = Sprite::new();
        assert!(!s.is_ok());
        assert_eq!(s.mode(), SpriteMode::Normal);
        assert_eq!(s.scale(), Vec2::ONE);
        assert!(s.rotation_surface().is_none());
        assert!(s.render_info().is_none());
    }

    #[test]
    fn ok_requires_spriteset_and_palette() {
        let mut s = Sprite::new();
        s.palette = Some(Rc::new(Palette::new(4)));
        s.refresh_ok();
        assert!(!s.is_ok());
    }

    #[test]
    fn blitter_follows_flip_and_blend() {
        let mut s = Sprite::new();
        s.flags = SpriteFlags::FLIP_X;
        s.blend = Some(Rc::new(BlendTable::for_mode(BlendMode::Add)));
        s.select_blitter();
        assert!(s.blitter().flip_x());
        assert!(s.blitter().blending());
        assert!(!s.blitter().scaling());
    }
}
