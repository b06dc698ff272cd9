//! Read-only intensity access over 2D images.
//!
//! Coordinates follow one convention across the crate: `x` is the column
//! index, `y` is the row index, origin at the top-left pixel.

use std::ops::Deref;

use image::{ImageBuffer, Luma, Primitive};

/// A 2D array of non-negative intensity samples.
pub trait IntensityImage {
    /// Image size as `(width, height)` = `(columns, rows)`.
    fn dimensions(&self) -> (u32, u32);

    /// Intensity at column `x`, row `y`.
    ///
    /// Callers guarantee `x < width` and `y < height`.
    fn intensity(&self, x: u32, y: u32) -> f64;

    /// Number of columns.
    #[inline]
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Number of rows.
    #[inline]
    fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Bounds-checked intensity lookup with signed indices.
    ///
    /// Returns `None` when `(x, y)` falls outside `[0, width) × [0, height)`.
    #[inline]
    fn intensity_checked(&self, x: i64, y: i64) -> Option<f64> {
        let (w, h) = self.dimensions();
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            return None;
        }
        Some(self.intensity(x as u32, y as u32))
    }
}

impl<T, C> IntensityImage for ImageBuffer<Luma<T>, C>
where
    T: Primitive + Into<f64>,
    C: Deref<Target = [T]>,
{
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn intensity(&self, x: u32, y: u32) -> f64 {
        self.get_pixel(x, y).0[0].into()
    }
}
