//! Spritesets: an atlas bitmap, its frame table and a default palette.

use std::rc::Rc;

use crate::assets::bitmap::{Bitmap, PixelFormat, PixelView};
use crate::assets::manifest::SpritesetManifest;
use crate::assets::palette::Palette;
use crate::core::error::SpriteError;
use crate::core::fixed::Fix;

/// One sub-rectangle of the atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFrame {
    pub name: String,
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// Atlas of sprite frames backed by one bitmap.
#[derive(Debug)]
pub struct Spriteset {
    bitmap: Bitmap,
    frames: Vec<SpriteFrame>,
    views: Vec<PixelView>,
    palette: Option<Rc<Palette>>,
}

impl Spriteset {
    /// Build a spriteset from explicit frames. Every frame must lie inside
    /// the bitmap and have a non-zero size, and its diagonal must fit the
    /// 16.16 integer range so any rotation of it can still be scanned.
    pub fn new(
        bitmap: Bitmap,
        frames: Vec<SpriteFrame>,
        palette: Option<Rc<Palette>>,
    ) -> Result<Self, SpriteError> {
        let views = frames
            .iter()
            .map(|f| {
                if f.w == 0 || f.h == 0 || !fits_scan_range(f.w, f.h) {
                    return None;
                }
                bitmap.view(f.x, f.y, f.w, f.h)
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(SpriteError::InvalidReference("sprite frame"))?;
        Ok(Self { bitmap, frames, views, palette })
    }

    /// Slice the bitmap into a row-major grid of `frame_w × frame_h` cells,
    /// named by their index.
    pub fn from_grid(
        bitmap: Bitmap,
        frame_w: usize,
        frame_h: usize,
        palette: Option<Rc<Palette>>,
    ) -> Result<Self, SpriteError> {
        let frames = grid_frames(&bitmap, frame_w, frame_h)?;
        Self::new(bitmap, frames, palette)
    }

    /// Build from a JSON frame manifest.
    pub fn from_manifest(
        bitmap: Bitmap,
        manifest: &SpritesetManifest,
        palette: Option<Rc<Palette>>,
    ) -> Result<Self, SpriteError> {
        let mut frames = match manifest.grid {
            Some(grid) => grid_frames(&bitmap, grid.frame_width, grid.frame_height)?,
            None => Vec::new(),
        };
        frames.extend(manifest.frames.iter().map(|d| SpriteFrame {
            name: d.name.clone(),
            x: d.x,
            y: d.y,
            w: d.w,
            h: d.h,
        }));
        Self::new(bitmap, frames, palette)
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn format(&self) -> PixelFormat {
        self.bitmap.format()
    }

    /// Default palette adopted by sprites that use this spriteset.
    pub fn palette(&self) -> Option<&Rc<Palette>> {
        self.palette.as_ref()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&SpriteFrame> {
        self.frames.get(index)
    }

    /// Validated view of frame `index` inside the atlas bitmap.
    pub fn frame_view(&self, index: usize) -> Option<PixelView> {
        self.views.get(index).copied()
    }

    /// Index of the first frame called `name`.
    pub fn find_frame(&self, name: &str) -> Option<usize> {
        self.frames.iter().position(|f| f.name == name)
    }
}

fn grid_frames(
    bitmap: &Bitmap,
    frame_w: usize,
    frame_h: usize,
) -> Result<Vec<SpriteFrame>, SpriteError> {
    if frame_w == 0 || frame_h == 0 {
        return Err(SpriteError::InvalidReference("sprite frame"));
    }
    let cols = bitmap.width() / frame_w;
    let rows = bitmap.height() / frame_h;
    let mut frames = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            frames.push(SpriteFrame {
                name: index.to_string(),
                x: col * frame_w,
                y: row * frame_h,
                w: frame_w,
                h: frame_h,
            });
        }
    }
    Ok(frames)
}

fn fits_scan_range(w: usize, h: usize) -> bool {
    let limit = Fix::MAX_INT as u64;
    let (w, h) = (w as u64, h as u64);
    // rounded rotation corners can widen the box by one pixel
    let diagonal = limit - 1;
    w <= limit && h <= limit && w * w + h * h <= diagonal * diagonal
}
