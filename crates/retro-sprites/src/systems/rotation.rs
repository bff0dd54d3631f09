//! Rotation engine: pre-rotates one sprite frame into an owned surface.
//!
//! The four footprint corners are pushed through a pivot rotation, rounded
//! to whole pixels, and the source is forward-splatted into a surface the
//! size of their bounding box. Each source pixel lands where its centre
//! maps to, so right angles permute pixels exactly; other angles may leave
//! unwritten (transparent) holes.

use glam::{Affine2, IVec2, Vec2};

use crate::assets::bitmap::{Bitmap, PixelView};
use crate::core::error::SpriteError;
use crate::core::fixed::{FixVec2, ScanVector};

/// A frame rotated into its own bitmap, positioned relative to the sprite.
#[derive(Debug)]
pub struct RotatedSurface {
    bitmap: Bitmap,
    offset: IVec2,
    angle: f32,
}

impl RotatedSurface {
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Top-left of the rotated footprint relative to the sprite position.
    pub fn offset(&self) -> IVec2 {
        self.offset
    }

    /// Reduced angle in degrees, in `(-360, 360)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.bitmap.width() as i32, self.bitmap.height() as i32)
    }
}

/// Corners of a `size` footprint at `pos`, rotated by `angle` degrees
/// about its centre and rounded to whole pixels. Order: top-left,
/// top-right, bottom-right, bottom-left of the unrotated frame.
///
/// The rotation runs in frame-local space and `pos` is added afterwards in
/// integers, so the result does not depend on how far the sprite sits from
/// the origin.
pub fn rotated_corners(pos: IVec2, size: IVec2, angle: f32) -> [IVec2; 4] {
    local_corners(size, angle).map(|corner| pos.saturating_add(corner))
}

fn local_corners(size: IVec2, angle: f32) -> [IVec2; 4] {
    let extent = size.as_vec2();
    let pivot = extent * 0.5;
    let transform = Affine2::from_translation(pivot)
        * Affine2::from_angle(angle.to_radians())
        * Affine2::from_translation(-pivot);

    [
        Vec2::ZERO,
        Vec2::new(extent.x, 0.0),
        extent,
        Vec2::new(0.0, extent.y),
    ]
    .map(|corner| {
        let p = transform.transform_point2(corner);
        IVec2::new(p.x.round() as i32, p.y.round() as i32)
    })
}

/// Rotate the `view` region of `src` by `angle` degrees about its centre.
/// The surface offset is relative to the sprite position, so the result
/// does not depend on where the sprite sits.
///
/// The returned surface is freshly allocated; nothing is written to the
/// caller's state, so a failed allocation leaves the sprite untouched.
pub fn rotate_frame(
    src: &Bitmap,
    view: PixelView,
    angle: f32,
) -> Result<RotatedSurface, SpriteError> {
    if !angle.is_finite() {
        return Err(SpriteError::InvalidAngle(angle));
    }
    let angle = angle % 360.0;
    let (w, h) = (view.width as i32, view.height as i32);

    let corners = local_corners(IVec2::new(w, h), angle);
    let min = corners.iter().copied().fold(IVec2::MAX, IVec2::min);
    let max = corners.iter().copied().fold(IVec2::MIN, IVec2::max);
    let size = max - min;

    let mut bitmap = Bitmap::new(size.x as usize, size.y as usize, view.format)?;
    let [c0, c1, _, c3] = corners.map(|c| c - min);

    let column = ScanVector::between(c0, c1, w);
    let mut row = ScanVector::between(c0, c3, h);
    // sample at pixel centres
    row.pos += FixVec2::new(
        column.step.x / 2 + row.step.x / 2,
        column.step.y / 2 + row.step.y / 2,
    );

    let bpp = view.format.bytes_per_pixel();
    for y in 0..view.height {
        let Some(line) = src.view_row(&view, y) else {
            break;
        };
        let mut dst = ScanVector {
            pos: row.pos,
            step: column.step,
        };
        for px in line.chunks_exact(bpp) {
            let at = dst.pixel();
            bitmap.put_pixel(at.x, at.y, px);
            dst.advance();
        }
        row.advance();
    }

    log::trace!(
        "rotated {}x{} frame by {} deg into {}x{} surface",
        w,
        h,
        angle,
        size.x,
        size.y
    );
    Ok(RotatedSurface {
        bitmap,
        offset: min,
        angle,
    })
}
