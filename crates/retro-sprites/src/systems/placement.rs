//! Clip/placement: derive a sprite's source and destination rectangles
//! from its mode, position and scale, clipped to the framebuffer.
//!
//! Blitting `srcrect` to `dstrect` is equivalent to blitting the whole
//! sprite and discarding what falls off screen. Every clipped destination
//! pixel removes `step` source units from the same side of `srcrect`.

use glam::{IVec2, Vec2};

use crate::components::sprite::{ModeState, Sprite};
use crate::core::fixed::{Fix, FixVec2};
use crate::core::rect::Rect;

/// Recompute `srcrect`, `dstrect` and `step` for `sprite` against the
/// framebuffer rectangle `screen`. Sprites without a frame are left alone.
pub fn update_sprite(sprite: &mut Sprite, screen: Rect) {
    let Some(size) = sprite.frame_size() else {
        return;
    };
    let pos = sprite.pos;

    let (dst, src, step) = match &sprite.mode {
        ModeState::Normal => unit_rects(pos, size),
        ModeState::Scaling => scaled_rects(pos, size, sprite.scale),
        ModeState::Transform(surface) => unit_rects(pos + surface.offset(), surface.size()),
    };
    let (dst, src) = clip(dst, src, step, screen);

    sprite.dstrect = dst;
    sprite.srcrect = src;
    sprite.step = step;
    log::trace!(
        "placed sprite at {:?}: src={:?} dst={:?}",
        pos,
        src.to_int(),
        dst
    );
}

/// Rectangles for a 1:1 blit of a `size` image whose top-left is `origin`.
fn unit_rects(origin: IVec2, size: IVec2) -> (Rect, Rect<Fix>, FixVec2) {
    (
        Rect::from_size(origin.x, origin.y, size.x, size.y),
        Rect::from_size(0, 0, size.x, size.y).to_fix(),
        FixVec2::ONE,
    )
}

/// Rectangles for a scaled blit, centred on the unscaled footprint.
fn scaled_rects(pos: IVec2, size: IVec2, scale: Vec2) -> (Rect, Rect<Fix>, FixVec2) {
    let dst_w = (size.x as f32 * scale.x) as i32;
    let dst_h = (size.y as f32 * scale.y) as i32;
    let x1 = pos.x.saturating_add((size.x - dst_w) >> 1);
    let y1 = pos.y.saturating_add((size.y - dst_h) >> 1);

    let src = Rect::from_size(0, 0, size.x, size.y).to_fix();
    let step = FixVec2::new(per_pixel(src.width(), dst_w), per_pixel(src.height(), dst_h));
    (Rect::from_size(x1, y1, dst_w, dst_h), src, step)
}

fn per_pixel(src_len: Fix, dst_len: i32) -> Fix {
    if dst_len > 0 {
        src_len / dst_len
    } else {
        Fix::ZERO
    }
}

/// Clip `dst` to `screen`, trimming `src` by `step` per clipped pixel.
///
/// A rectangle that ends up entirely off screen collapses to a zero-area
/// rectangle on the nearest screen edge.
pub fn clip(mut dst: Rect, mut src: Rect<Fix>, step: FixVec2, screen: Rect) -> (Rect, Rect<Fix>) {
    clip_axis(
        (&mut dst.x1, &mut dst.x2),
        (&mut src.x1, &mut src.x2),
        (screen.x1, screen.x2),
        step.x,
    );
    clip_axis(
        (&mut dst.y1, &mut dst.y2),
        (&mut src.y1, &mut src.y2),
        (screen.y1, screen.y2),
        step.y,
    );
    (dst, src)
}

fn clip_axis(
    (d1, d2): (&mut i32, &mut i32),
    (s1, s2): (&mut Fix, &mut Fix),
    (lo, hi): (i32, i32),
    step: Fix,
) {
    if *d1 < lo {
        *s1 += source_cut(step, lo as i64 - *d1 as i64, *s2 - *s1);
        *d1 = lo;
    }
    if *d2 > hi {
        *s2 -= source_cut(step, *d2 as i64 - hi as i64, *s2 - *s1);
        *d2 = hi;
    }
    if *d2 < *d1 {
        let edge = (*d1).clamp(lo, hi);
        *d1 = edge;
        *d2 = edge;
        *s2 = *s1;
    }
}

/// Source units covered by `pixels` destination pixels, capped at what is
/// left of the source span.
fn source_cut(step: Fix, pixels: i64, remaining: Fix) -> Fix {
    let cut = step.raw() as i64 * pixels;
    Fix::from_raw(cut.clamp(0, remaining.raw().max(0) as i64) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SCREEN: Rect = Rect::from_size(0, 0, 256, 224);

    #[test]
    fn unclipped_normal_is_identity() {
        let (dst, src, step) = unit_rects(IVec2::new(10, 20), IVec2::new(16, 8));
        let (dst, src) = clip(dst, src, step, SCREEN);
        assert_eq!(dst, Rect::new(10, 20, 26, 28));
        assert_eq!(src.to_int(), Rect::new(0, 0, 16, 8));
    }

    #[test]
    fn left_clip_skips_source_columns() {
        let (dst, src, step) = unit_rects(IVec2::new(-4, 0), IVec2::new(16, 16));
        let (dst, src) = clip(dst, src, step, SCREEN);
        assert_eq!(dst.x1, 0);
        assert_eq!(dst.x2, 12);
        assert_eq!(src.x1, Fix::from_int(4));
        assert_eq!(src.x2, Fix::from_int(16));
    }

    #[test]
    fn bottom_right_clip() {
        let (dst, src, step) = unit_rects(IVec2::new(250, 220), IVec2::new(16, 16));
        let (dst, src) = clip(dst, src, step, SCREEN);
        assert_eq!(dst, Rect::new(250, 220, 256, 224));
        assert_eq!(src.to_int(), Rect::new(0, 0, 6, 4));
    }

    #[test]
    fn fully_off_screen_collapses() {
        let (dst, src, step) = unit_rects(IVec2::new(-100, 300), IVec2::new(16, 16));
        let (dst, src) = clip(dst, src, step, SCREEN);
        assert!(dst.is_empty());
        assert!(SCREEN.contains_rect(&dst));
        assert_eq!(src.x1, src.x2);
        assert_eq!(src.y1, src.y2);
    }

    #[test]
    fn scaled_is_centred_with_half_step() {
        let (dst, src, step) = scaled_rects(IVec2::new(100, 100), IVec2::new(8, 8), Vec2::splat(2.0));
        assert_eq!(dst, Rect::new(96, 96, 112, 112));
        assert_eq!(src.to_int(), Rect::new(0, 0, 8, 8));
        assert_eq!(step, FixVec2::new(Fix::HALF, Fix::HALF));
    }

    #[test]
    fn scaled_clip_uses_step() {
        // 8x8 at origin, doubled: dst starts at -4, four clipped pixels are two source pixels
        let (dst, src, step) = scaled_rects(IVec2::ZERO, IVec2::new(8, 8), Vec2::splat(2.0));
        let (dst, src) = clip(dst, src, step, SCREEN);
        assert_eq!(dst, Rect::new(0, 0, 12, 12));
        assert_eq!(src.x1, Fix::from_int(2));
        assert_eq!(src.y1, Fix::from_int(2));
        assert_eq!(src.x2, Fix::from_int(8));
    }

    #[test]
    fn zero_sized_scale_yields_empty_rect() {
        let (dst, _, step) = scaled_rects(IVec2::new(10, 10), IVec2::new(8, 8), Vec2::splat(0.01));
        assert!(dst.is_empty());
        assert_eq!(step.x, Fix::ZERO);
    }

    proptest! {
        #[test]
        fn dst_always_inside_screen(
            x in -2000i32..2000,
            y in -2000i32..2000,
            w in 1i32..128,
            h in 1i32..128,
            sx in 0.05f32..8.0,
            sy in 0.05f32..8.0,
        ) {
            let (dst, src, step) = scaled_rects(IVec2::new(x, y), IVec2::new(w, h), Vec2::new(sx, sy));
            let (dst, src) = clip(dst, src, step, SCREEN);
            prop_assert!(SCREEN.contains_rect(&dst));
            prop_assert!(src.x1 <= src.x2 && src.y1 <= src.y2);

            let (dst, _, step) = unit_rects(IVec2::new(x, y), IVec2::new(w, h));
            let (dst, _) = clip(dst, Rect::from_size(0, 0, w, h).to_fix(), step, SCREEN);
            prop_assert!(SCREEN.contains_rect(&dst));
        }

        #[test]
        fn normal_clip_is_linear(x in -15i32..0, y in 209i32..224) {
            let size = IVec2::new(16, 16);
            let (dst, src, step) = unit_rects(IVec2::new(x, y), size);
            let (cdst, csrc) = clip(dst, src, step, SCREEN);
            prop_assert_eq!(csrc.x1, Fix::from_int(cdst.x1 - dst.x1));
            prop_assert_eq!(Fix::from_int(16) - csrc.y2, Fix::from_int(dst.y2 - cdst.y2));
        }

        #[test]
        fn scaled_clip_is_linear(x in -40i32..0, scale in 1.5f32..4.0) {
            let size = IVec2::new(16, 16);
            let (dst, src, step) = scaled_rects(IVec2::new(x, 50), size, Vec2::splat(scale));
            prop_assume!(dst.x1 < 0 && dst.x2 > 0);
            let (cdst, csrc) = clip(dst, src, step, SCREEN);
            prop_assert_eq!(csrc.x1, step.x * (cdst.x1 - dst.x1));
        }

        #[test]
        fn scaled_clip_is_linear_on_far_edges(
            x in 230i32..262,
            y in 200i32..230,
            sx in 1.5f32..4.0,
            sy in 0.5f32..4.0,
        ) {
            let size = IVec2::new(16, 16);
            let (dst, src, step) = scaled_rects(IVec2::new(x, y), size, Vec2::new(sx, sy));
            prop_assume!(dst.x1 < SCREEN.x2 && dst.x2 > SCREEN.x2);
            prop_assume!(dst.y1 < SCREEN.y2 && dst.y2 > SCREEN.y2);
            let (cdst, csrc) = clip(dst, src, step, SCREEN);
            prop_assert_eq!(cdst.x2, SCREEN.x2);
            prop_assert_eq!(cdst.y2, SCREEN.y2);
            prop_assert_eq!(csrc.x1, Fix::ZERO);
            prop_assert_eq!(src.x2 - csrc.x2, step.x * (dst.x2 - cdst.x2));
            prop_assert_eq!(src.y2 - csrc.y2, step.y * (dst.y2 - cdst.y2));
        }
    }
}
