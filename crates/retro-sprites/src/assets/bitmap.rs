//! Owned pixel buffers and bounds-checked views into them.

use std::cell::Cell;

use crate::core::error::SpriteError;

/// Storage format of a bitmap's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// One byte per pixel, an index into a palette. Index 0 is transparent.
    #[default]
    Indexed8,
    /// Four bytes per pixel, `r, g, b, a`. Alpha 0 is transparent.
    Rgba32,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Indexed8 => 1,
            PixelFormat::Rgba32 => 4,
        }
    }

    pub const fn bits_per_pixel(self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }
}

thread_local! {
    static LIVE_BITMAPS: Cell<usize> = const { Cell::new(0) };
}

/// A rectangular window into a bitmap: `(offset, stride, width, height)`.
///
/// Views are only handed out after validation against the bitmap they were
/// cut from, so reading through [`Bitmap::view_row`] never indexes outside
/// the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelView {
    /// Byte offset of the view's top-left pixel.
    pub offset: usize,
    /// Bytes between consecutive rows.
    pub stride: usize,
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
}

impl PixelView {
    /// Number of bytes of one row of the view.
    pub fn row_bytes(&self) -> usize {
        self.width * self.format.bytes_per_pixel()
    }
}

/// Owned pixel buffer.
#[derive(Debug)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pitch: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Bitmap {
    /// Allocate a zero-filled bitmap. Allocation failure is reported, not
    /// aborted on.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self, SpriteError> {
        let pitch = width * format.bytes_per_pixel();
        let bytes = pitch
            .checked_mul(height)
            .ok_or(SpriteError::OutOfMemory { bytes: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| SpriteError::OutOfMemory { bytes })?;
        data.resize(bytes, 0);
        Ok(Self::track(Self { width, height, pitch, format, data }))
    }

    /// Wrap existing pixel data laid out with `pitch = width * bpp`.
    pub fn from_pixels(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, SpriteError> {
        let pitch = width * format.bytes_per_pixel();
        if data.len() != pitch * height {
            return Err(SpriteError::InvalidReference("bitmap data"));
        }
        Ok(Self::track(Self { width, height, pitch, format, data }))
    }

    fn track(bitmap: Self) -> Self {
        LIVE_BITMAPS.with(|c| c.set(c.get() + 1));
        bitmap
    }

    /// Bitmaps alive on the current thread. Lets tests detect leaked or
    /// double-held surfaces.
    pub fn live_count() -> usize {
        LIVE_BITMAPS.with(|c| c.get())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of the pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let start = y * self.pitch + x * bpp;
        Some(&self.data[start..start + bpp])
    }

    /// Overwrite the pixel at `(x, y)`. Writes outside the bitmap, or with a
    /// mismatched pixel size, are dropped and reported as `false`.
    pub fn put_pixel(&mut self, x: i32, y: i32, value: &[u8]) -> bool {
        let bpp = self.format.bytes_per_pixel();
        if x < 0 || y < 0 || value.len() != bpp {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return false;
        }
        let start = y * self.pitch + x * bpp;
        self.data[start..start + bpp].copy_from_slice(value);
        true
    }

    /// Mutable bytes of row `y`, `None` past the last row.
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.pitch;
        self.data.get_mut(start..start + self.pitch)
    }

    /// Cut a view of `w × h` pixels at `(x, y)`.
    pub fn view(&self, x: usize, y: usize, w: usize, h: usize) -> Option<PixelView> {
        if x.checked_add(w)? > self.width || y.checked_add(h)? > self.height {
            return None;
        }
        Some(PixelView {
            offset: y * self.pitch + x * self.format.bytes_per_pixel(),
            stride: self.pitch,
            width: w,
            height: h,
            format: self.format,
        })
    }

    /// View covering the whole bitmap.
    pub fn full_view(&self) -> PixelView {
        PixelView {
            offset: 0,
            stride: self.pitch,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    /// Row `row` of a view cut from this bitmap, or `None` past its height.
    pub fn view_row(&self, view: &PixelView, row: usize) -> Option<&[u8]> {
        if row >= view.height {
            return None;
        }
        let start = view.offset + row * view.stride;
        self.data.get(start..start + view.row_bytes())
    }
}

impl Clone for Bitmap {
    fn clone(&self) -> Self {
        Self::track(Self {
            width: self.width,
            height: self.height,
            pitch: self.pitch,
            format: self.format,
            data: self.data.clone(),
        })
    }
}

impl Drop for Bitmap {
    fn drop(&mut self) {
        LIVE_BITMAPS.with(|c| c.set(c.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bitmap_is_zeroed() {
        let bmp = Bitmap::new(4, 3, PixelFormat::Rgba32).unwrap();
        assert_eq!(bmp.pitch(), 16);
        assert_eq!(bmp.data().len(), 48);
        assert!(bmp.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn put_and_read_pixel() {
        let mut bmp = Bitmap::new(4, 4, PixelFormat::Indexed8).unwrap();
        assert!(bmp.put_pixel(2, 1, &[7]));
        assert_eq!(bmp.pixel(2, 1), Some(&[7u8][..]));
        assert!(!bmp.put_pixel(-1, 0, &[1]));
        assert!(!bmp.put_pixel(4, 0, &[1]));
        assert!(!bmp.put_pixel(0, 0, &[1, 2]));
        assert!(bmp.pixel(4, 0).is_none());
    }

    #[test]
    fn views_are_bounds_checked() {
        let bmp = Bitmap::new(16, 8, PixelFormat::Indexed8).unwrap();
        let view = bmp.view(8, 0, 8, 8).unwrap();
        assert_eq!(view.offset, 8);
        assert_eq!(bmp.view_row(&view, 7).unwrap().len(), 8);
        assert!(bmp.view_row(&view, 8).is_none());
        assert!(bmp.view(9, 0, 8, 8).is_none());
        assert!(bmp.view(usize::MAX, 0, 8, 8).is_none());
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(Bitmap::from_pixels(2, 2, PixelFormat::Indexed8, vec![0; 4]).is_ok());
        assert!(Bitmap::from_pixels(2, 2, PixelFormat::Indexed8, vec![0; 3]).is_err());
    }

    #[test]
    fn live_count_tracks_drops() {
        let before = Bitmap::live_count();
        let a = Bitmap::new(1, 1, PixelFormat::Indexed8).unwrap();
        let b = a.clone();
        assert_eq!(Bitmap::live_count(), before + 2);
        drop(a);
        drop(b);
        assert_eq!(Bitmap::live_count(), before);
    }
}
