//! ARGB framebuffer and the reference scanline pass that draws sprites
//! from their published render info.

use crate::api::config::EngineConfig;
use crate::components::sprite::SpriteRenderInfo;
use crate::renderer::blitter::Span;

/// Packed `0xAARRGGBB` pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Framebuffer sized for `config`.
    pub fn for_config(config: &EngineConfig) -> Self {
        Self::new(config.width as usize, config.height as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn clear(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn row_mut(&mut self, y: usize) -> Option<&mut [u32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.pixels.get_mut(start..start + self.width)
    }

    /// Draw line `y` of one sprite. Lines outside its `dstrect` are ignored.
    pub fn draw_sprite_line(&mut self, info: &SpriteRenderInfo<'_>, y: i32) {
        let dst = info.dstrect;
        if !dst.covers_line(y) || dst.is_empty() {
            return;
        }

        let src_row = (info.srcrect.y1 + info.step.y * (y - dst.y1)).to_int();
        let row = if info.flags.flip_y() {
            info.pixels.height as i32 - 1 - src_row
        } else {
            src_row
        };
        if row < 0 {
            return;
        }
        let Some(line) = info.bitmap.view_row(&info.pixels, row as usize) else {
            return;
        };

        let span = Span {
            src: line,
            width: info.pixels.width,
            start: info.srcrect.x1,
            step: info.step.x,
            palette: info.palette,
            blend: info.blend,
        };
        let Some(out) = self
            .row_mut(y as usize)
            .and_then(|r| r.get_mut(dst.x1 as usize..dst.x2 as usize))
        else {
            return;
        };
        info.blitter.blit(&span, out);
    }

    /// Draw whole sprites, scanline by scanline, in slice order (first is
    /// at the back).
    pub fn draw_sprites(&mut self, sprites: &[SpriteRenderInfo<'_>]) {
        for y in 0..self.height as i32 {
            for info in sprites {
                self.draw_sprite_line(info, y);
            }
        }
    }
}
