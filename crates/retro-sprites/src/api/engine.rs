//! Public sprite API.
//!
//! [`SpriteEngine`] owns every sprite slot together with the framebuffer
//! geometry and blend tables they are placed against. Each entry point
//! validates its arguments before touching the addressed sprite, so a
//! failed call leaves that sprite exactly as it was. The outcome of the
//! most recent call is also published through [`SpriteEngine::last_error`].
//!
//! The engine is single-threaded: it is neither `Send` nor `Sync`, and one
//! thread is expected to drive the whole configure-then-render sequence of
//! a frame.

use std::cell::Cell;
use std::rc::Rc;

use glam::{IVec2, Vec2};

use crate::api::config::EngineConfig;
use crate::api::types::SpriteFlags;
use crate::assets::palette::Palette;
use crate::assets::spriteset::Spriteset;
use crate::components::sprite::{ModeState, Sprite, SpriteMode};
use crate::core::error::{ErrorCode, SpriteError};
use crate::core::rect::Rect;
use crate::renderer::blend::{BlendMode, BlendTable, BlendTables};
use crate::renderer::framebuffer::Framebuffer;
use crate::systems::placement;
use crate::systems::rotation::rotate_frame;

#[derive(Debug)]
pub struct SpriteEngine {
    config: EngineConfig,
    screen: Rect,
    sprites: Vec<Sprite>,
    blend_tables: BlendTables,
    last_error: Cell<ErrorCode>,
}

impl SpriteEngine {
    pub fn new(config: EngineConfig) -> Self {
        let sprites = (0..config.num_sprites).map(|_| Sprite::new()).collect();
        log::debug!(
            "sprite engine: {} slots on {}x{} framebuffer",
            config.num_sprites,
            config.width,
            config.height
        );
        Self {
            screen: config.screen_rect(),
            config,
            sprites,
            blend_tables: BlendTables::new(),
            last_error: Cell::new(ErrorCode::Ok),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn num_sprites(&self) -> usize {
        self.sprites.len()
    }

    pub fn framebuffer_size(&self) -> IVec2 {
        IVec2::new(self.screen.width(), self.screen.height())
    }

    /// Outcome of the most recent API call.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error.get()
    }

    /// Read-only view of one sprite slot.
    pub fn sprite(&self, id: usize) -> Result<&Sprite, SpriteError> {
        let result = self.sprites.get(id).ok_or(SpriteError::IndexOutOfRange {
            index: id,
            count: self.sprites.len(),
        });
        self.record(result)
    }

    /// All slots, in drawing order.
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Assign a spriteset and flags in one call.
    pub fn configure_sprite(
        &mut self,
        id: usize,
        spriteset: &Rc<Spriteset>,
        flags: SpriteFlags,
    ) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            assign_spriteset(sprite, spriteset)?;
            sprite.flags = flags;
            sprite.select_blitter();
            placement::update_sprite(sprite, screen);
            Ok(())
        })
    }

    /// Assign a spriteset, adopting its default palette and showing frame 0.
    pub fn set_sprite_set(&mut self, id: usize, spriteset: &Rc<Spriteset>) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            assign_spriteset(sprite, spriteset)?;
            sprite.select_blitter();
            placement::update_sprite(sprite, screen);
            Ok(())
        })
    }

    pub fn set_sprite_flags(&mut self, id: usize, flags: SpriteFlags) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, _| {
            sprite.flags = flags;
            sprite.select_blitter();
            Ok(())
        })
    }

    /// Move the sprite's top-left corner to `(x, y)` in screen pixels.
    pub fn set_sprite_position(&mut self, id: usize, x: i32, y: i32) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            sprite.pos = IVec2::new(x, y);
            placement::update_sprite(sprite, screen);
            Ok(())
        })
    }

    /// Show frame `picture` of the assigned spriteset.
    pub fn set_sprite_picture(&mut self, id: usize, picture: usize) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            let spriteset = sprite
                .spriteset
                .clone()
                .ok_or(SpriteError::InvalidReference("spriteset"))?;
            install_frame(sprite, &spriteset, picture)?;
            placement::update_sprite(sprite, screen);
            Ok(())
        })
    }

    /// Show the first frame called `name`.
    pub fn set_sprite_picture_by_name(&mut self, id: usize, name: &str) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            let spriteset = sprite
                .spriteset
                .clone()
                .ok_or(SpriteError::InvalidReference("spriteset"))?;
            let picture = spriteset
                .find_frame(name)
                .ok_or_else(|| SpriteError::UnknownPicture(name.to_string()))?;
            install_frame(sprite, &spriteset, picture)?;
            placement::update_sprite(sprite, screen);
            Ok(())
        })
    }

    /// Override the palette adopted from the spriteset.
    pub fn set_sprite_palette(&mut self, id: usize, palette: &Rc<Palette>) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, _| {
            if palette.is_empty() {
                return Err(SpriteError::InvalidReference("palette"));
            }
            sprite.palette = Some(Rc::clone(palette));
            sprite.refresh_ok();
            Ok(())
        })
    }

    pub fn get_sprite_palette(&self, id: usize) -> Result<Option<Rc<Palette>>, SpriteError> {
        self.sprite(id).map(|s| s.palette().cloned())
    }

    pub fn set_sprite_blend_mode(&mut self, id: usize, mode: BlendMode) -> Result<(), SpriteError> {
        let table = self.blend_tables.get(mode);
        self.with_sprite(id, |sprite, _| {
            sprite.blend = table?;
            sprite.blend_mode = mode;
            sprite.select_blitter();
            Ok(())
        })
    }

    /// Install the table used by [`BlendMode::Custom`]. Sprites already in
    /// that mode switch to the new table.
    pub fn set_custom_blend_table(&mut self, table: BlendTable) {
        self.blend_tables.set_custom(table);
        let custom = self.blend_tables.get(BlendMode::Custom).ok().flatten();
        for sprite in self.sprites.iter_mut().filter(|s| s.blend_mode == BlendMode::Custom) {
            sprite.blend = custom.clone();
            sprite.select_blitter();
        }
        self.last_error.set(ErrorCode::Ok);
    }

    /// Enter scaling mode with factors `(sx, sy)`. A rotated sprite loses
    /// its rotation.
    pub fn set_sprite_scaling(&mut self, id: usize, sx: f32, sy: f32) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
                return Err(SpriteError::InvalidScale { sx, sy });
            }
            sprite.scale = Vec2::new(sx, sy);
            sprite.mode = ModeState::Scaling;
            sprite.select_blitter();
            placement::update_sprite(sprite, screen);
            log::debug!(
                "sprite {}: scaling ({}, {}) dst={:?}",
                id,
                sx,
                sy,
                sprite.dstrect
            );
            Ok(())
        })
    }

    pub fn reset_sprite_scaling(&mut self, id: usize) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            sprite.scale = Vec2::ONE;
            if sprite.mode() == SpriteMode::Scaling {
                sprite.mode = ModeState::Normal;
                log::debug!("sprite {}: scaling off", id);
            }
            sprite.select_blitter();
            placement::update_sprite(sprite, screen);
            Ok(())
        })
    }

    /// Replace the sprite's image with its current frame rotated by
    /// `angle` degrees (clockwise) about the frame centre. Scaling is
    /// discarded.
    pub fn set_sprite_rotation(&mut self, id: usize, angle: f32) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            let (Some(spriteset), Some(view)) = (sprite.spriteset.as_ref(), sprite.pixels) else {
                return Err(SpriteError::InvalidReference("spriteset"));
            };
            let surface = rotate_frame(spriteset.bitmap(), view, angle)?;
            sprite.mode = ModeState::Transform(surface);
            sprite.scale = Vec2::ONE;
            sprite.select_blitter();
            placement::update_sprite(sprite, screen);
            log::debug!(
                "sprite {}: rotated {} deg, dst={:?}",
                id,
                angle,
                sprite.dstrect
            );
            Ok(())
        })
    }

    pub fn reset_sprite_rotation(&mut self, id: usize) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, screen| {
            if sprite.mode() == SpriteMode::Transform {
                sprite.mode = ModeState::Normal;
                log::debug!("sprite {}: rotation reset", id);
            }
            sprite.select_blitter();
            placement::update_sprite(sprite, screen);
            Ok(())
        })
    }

    pub fn get_sprite_picture(&self, id: usize) -> Result<usize, SpriteError> {
        self.sprite(id).map(Sprite::picture)
    }

    /// First slot that is not in use.
    pub fn get_available_sprite(&self) -> Option<usize> {
        self.last_error.set(ErrorCode::Ok);
        self.sprites.iter().position(|s| !s.is_ok())
    }

    pub fn enable_sprite_collision(&mut self, id: usize, enable: bool) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, _| {
            sprite.do_collision = enable;
            if !enable {
                sprite.collision = false;
            }
            Ok(())
        })
    }

    pub fn get_sprite_collision(&self, id: usize) -> Result<bool, SpriteError> {
        self.sprite(id).map(Sprite::collision)
    }

    /// Report the collision state found by the render loop. Ignored for
    /// sprites without collision checking.
    pub fn set_collision_result(&mut self, id: usize, hit: bool) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, _| {
            sprite.collision = hit && sprite.do_collision;
            Ok(())
        })
    }

    /// Stop drawing the sprite and hand its slot back to
    /// [`get_available_sprite`](Self::get_available_sprite).
    pub fn disable_sprite(&mut self, id: usize) -> Result<(), SpriteError> {
        self.with_sprite(id, |sprite, _| {
            sprite.ok = false;
            Ok(())
        })
    }

    /// Draw every enabled sprite into `fb`, lowest id at the back.
    pub fn render(&self, fb: &mut Framebuffer) {
        let infos: Vec<_> = self.sprites.iter().filter_map(Sprite::render_info).collect();
        fb.draw_sprites(&infos);
    }

    fn with_sprite<T>(
        &mut self,
        id: usize,
        f: impl FnOnce(&mut Sprite, Rect) -> Result<T, SpriteError>,
    ) -> Result<T, SpriteError> {
        let screen = self.screen;
        let count = self.sprites.len();
        let result = match self.sprites.get_mut(id) {
            Some(sprite) => f(sprite, screen),
            None => Err(SpriteError::IndexOutOfRange { index: id, count }),
        };
        self.record(result)
    }

    fn record<T>(&self, result: Result<T, SpriteError>) -> Result<T, SpriteError> {
        match &result {
            Ok(_) => self.last_error.set(ErrorCode::Ok),
            Err(e) => {
                log::debug!("sprite call failed: {}", e);
                self.last_error.set(e.code());
            }
        }
        result
    }
}

impl Default for SpriteEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Point `sprite` at `spriteset` and its frame 0, adopting the spriteset's
/// palette when it has one.
fn assign_spriteset(sprite: &mut Sprite, spriteset: &Rc<Spriteset>) -> Result<(), SpriteError> {
    if spriteset.is_empty() {
        return Err(SpriteError::InvalidReference("spriteset"));
    }
    install_frame(sprite, spriteset, 0)?;
    sprite.spriteset = Some(Rc::clone(spriteset));
    if let Some(palette) = spriteset.palette() {
        sprite.palette = Some(Rc::clone(palette));
    }
    sprite.refresh_ok();
    Ok(())
}

/// Select frame `picture`, re-rotating it first if the sprite is rotated.
/// Nothing is changed on failure.
fn install_frame(sprite: &mut Sprite, spriteset: &Spriteset, picture: usize) -> Result<(), SpriteError> {
    let view = spriteset
        .frame_view(picture)
        .ok_or(SpriteError::PictureOutOfRange {
            index: picture,
            count: spriteset.len(),
        })?;
    let rotated = match sprite.rotation_surface() {
        Some(old) => Some(rotate_frame(spriteset.bitmap(), view, old.angle())?),
        None => None,
    };
    sprite.picture = picture;
    sprite.pixels = Some(view);
    if let Some(surface) = rotated {
        sprite.mode = ModeState::Transform(surface);
    }
    Ok(())
}
