//! Blitter selection and the scanline kernels behind each handle.
//!
//! A [`Blitter`] is resolved once whenever a sprite's mode, flags or blend
//! change, then reused for every scanline. Each of the sixteen
//! {format, flip, scaling, blend} combinations is a monomorphised copy of
//! one kernel, so the per-pixel loop carries no runtime branching on those
//! properties.

use crate::assets::bitmap::PixelFormat;
use crate::assets::palette::{Color, Palette};
use crate::core::fixed::Fix;
use crate::renderer::blend::BlendTable;

const RGBA_BIT: u8 = 0b1000;
const FLIP_BIT: u8 = 0b0100;
const SCALE_BIT: u8 = 0b0010;
const BLEND_BIT: u8 = 0b0001;

/// Source side of one scanline blit.
#[derive(Debug, Clone, Copy)]
pub struct Span<'a> {
    /// One whole source row, `width` pixels wide.
    pub src: &'a [u8],
    /// Width of the source row in pixels.
    pub width: usize,
    /// Source column of the first destination pixel, counted on the
    /// unflipped image.
    pub start: Fix,
    /// Source columns advanced per destination pixel (scaling kernels only).
    pub step: Fix,
    /// Color table for `Indexed8` sources.
    pub palette: Option<&'a Palette>,
    /// Blend table for blending kernels.
    pub blend: Option<&'a BlendTable>,
}

type KernelFn = fn(&Span<'_>, &mut [u32]);

/// Opaque handle to one pixel-copy routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blitter(u8);

impl Blitter {
    /// Resolve the routine for a combination of source format, horizontal
    /// flip, scaling and blending. Every combination has a routine.
    pub fn select(format: PixelFormat, flip_x: bool, scaling: bool, blend: bool) -> Self {
        let mut key = 0;
        if format == PixelFormat::Rgba32 {
            key |= RGBA_BIT;
        }
        if flip_x {
            key |= FLIP_BIT;
        }
        if scaling {
            key |= SCALE_BIT;
        }
        if blend {
            key |= BLEND_BIT;
        }
        Blitter(key)
    }

    pub fn format(self) -> PixelFormat {
        if self.0 & RGBA_BIT != 0 {
            PixelFormat::Rgba32
        } else {
            PixelFormat::Indexed8
        }
    }

    pub fn flip_x(self) -> bool {
        self.0 & FLIP_BIT != 0
    }

    pub fn scaling(self) -> bool {
        self.0 & SCALE_BIT != 0
    }

    pub fn blending(self) -> bool {
        self.0 & BLEND_BIT != 0
    }

    /// Index of the routine in the kernel table.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Draw one span into `dst`, one destination pixel per element.
    #[inline]
    pub fn blit(self, span: &Span<'_>, dst: &mut [u32]) {
        KERNELS[self.index()](span, dst)
    }
}

impl Default for Blitter {
    fn default() -> Self {
        Self::select(PixelFormat::Indexed8, false, false, false)
    }
}

/// Kernel table, indexed by the handle's key bits.
static KERNELS: [KernelFn; 16] = [
    kernel::<false, false, false, false>,
    kernel::<false, false, false, true>,
    kernel::<false, false, true, false>,
    kernel::<false, false, true, true>,
    kernel::<false, true, false, false>,
    kernel::<false, true, false, true>,
    kernel::<false, true, true, false>,
    kernel::<false, true, true, true>,
    kernel::<true, false, false, false>,
    kernel::<true, false, false, true>,
    kernel::<true, false, true, false>,
    kernel::<true, false, true, true>,
    kernel::<true, true, false, false>,
    kernel::<true, true, false, true>,
    kernel::<true, true, true, false>,
    kernel::<true, true, true, true>,
];

fn kernel<const RGBA: bool, const FLIP: bool, const SCALE: bool, const BLEND: bool>(
    span: &Span<'_>,
    dst: &mut [u32],
) {
    let bpp = if RGBA { 4 } else { 1 };
    let last = span.width as i32 - 1;
    let first = span.start.to_int();
    let mut pos = span.start;

    for (i, out) in dst.iter_mut().enumerate() {
        let col = if SCALE {
            let c = pos.to_int();
            pos += span.step;
            c
        } else {
            first + i as i32
        };
        let col = if FLIP { last - col } else { col };
        if col < 0 || col > last {
            continue;
        }
        let offset = col as usize * bpp;
        let Some(px) = span.src.get(offset..offset + bpp) else {
            continue;
        };

        let color = if RGBA {
            let c = Color::from_bytes(px);
            if c.a == 0 {
                continue;
            }
            c.to_argb()
        } else {
            // index 0 is the color key
            if px[0] == 0 {
                continue;
            }
            match span.palette {
                Some(pal) => pal.color(px[0]).to_argb(),
                None => continue,
            }
        };

        *out = match (BLEND, span.blend) {
            (true, Some(table)) => table.blend_argb(color, *out),
            _ => color,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::blend::BlendMode;

    fn gray_palette() -> Palette {
        Palette::from_colors((0..=255u8).map(|i| Color::rgb(i, i, i)).collect())
    }

    fn span<'a>(src: &'a [u8], width: usize, palette: Option<&'a Palette>) -> Span<'a> {
        Span {
            src,
            width,
            start: Fix::ZERO,
            step: Fix::ONE,
            palette,
            blend: None,
        }
    }

    #[test]
    fn every_combination_resolves_distinctly() {
        let mut seen = std::collections::HashSet::new();
        for format in [PixelFormat::Indexed8, PixelFormat::Rgba32] {
            for flip in [false, true] {
                for scale in [false, true] {
                    for blend in [false, true] {
                        let b = Blitter::select(format, flip, scale, blend);
                        assert_eq!(b.format(), format);
                        assert_eq!(b.flip_x(), flip);
                        assert_eq!(b.scaling(), scale);
                        assert_eq!(b.blending(), blend);
                        assert!(seen.insert(b.index()));
                    }
                }
            }
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn indexed_copy_skips_color_key() {
        let pal = gray_palette();
        let src = [0u8, 10, 20, 0];
        let mut dst = [7u32; 4];
        Blitter::select(PixelFormat::Indexed8, false, false, false)
            .blit(&span(&src, 4, Some(&pal)), &mut dst);
        assert_eq!(dst, [7, 0xFF0A_0A0A, 0xFF14_1414, 7]);
    }

    #[test]
    fn flip_reads_row_backwards() {
        let pal = gray_palette();
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u32; 3];
        let mut s = span(&src, 4, Some(&pal));
        s.start = Fix::from_int(1);
        Blitter::select(PixelFormat::Indexed8, true, false, false).blit(&s, &mut dst);
        // columns 1..4 of the flipped row are source columns 2, 1, 0
        assert_eq!(dst, [0xFF03_0303, 0xFF02_0202, 0xFF01_0101]);
    }

    #[test]
    fn scaling_repeats_source_pixels() {
        let pal = gray_palette();
        let src = [5u8, 6];
        let mut dst = [0u32; 4];
        let mut s = span(&src, 2, Some(&pal));
        s.step = Fix::HALF;
        Blitter::select(PixelFormat::Indexed8, false, true, false).blit(&s, &mut dst);
        assert_eq!(dst, [0xFF05_0505, 0xFF05_0505, 0xFF06_0606, 0xFF06_0606]);
    }

    #[test]
    fn rgba_skips_transparent_and_blends() {
        let table = BlendTable::for_mode(BlendMode::Mix50);
        let src = [200u8, 100, 0, 255, 9, 9, 9, 0];
        let mut dst = [0xFF00_0000u32, 0xFF12_3456];
        let mut s = span(&src, 2, None);
        s.blend = Some(&table);
        Blitter::select(PixelFormat::Rgba32, false, false, true).blit(&s, &mut dst);
        assert_eq!(dst, [0xFF64_3200, 0xFF12_3456]);
    }

    #[test]
    fn reads_past_the_row_are_dropped() {
        let pal = gray_palette();
        let src = [1u8, 2];
        let mut dst = [0u32; 4];
        Blitter::default().blit(&span(&src, 2, Some(&pal)), &mut dst);
        assert_eq!(dst[2..], [0, 0]);
    }
}
