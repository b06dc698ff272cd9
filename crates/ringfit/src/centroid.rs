//! Intensity centroid of a thresholded window via first-order moments.

use serde::{Deserialize, Serialize};

use crate::image_view::IntensityImage;

/// Errors from centroid estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CentroidError {
    /// `threshold_fraction` is outside `(0, 1]` or not finite.
    InvalidThreshold {
        /// Offending fraction.
        threshold_fraction: f64,
    },
    /// The window does not overlap the image.
    EmptyWindow {
        /// Requested window.
        window: Window,
        /// Image size `[width, height]`.
        image_size: [u32; 2],
    },
    /// Total intensity after thresholding is zero.
    NoIntensity {
        /// Window maximum before thresholding.
        window_max: f64,
        /// Absolute threshold that zeroed every pixel.
        threshold: f64,
    },
}

impl std::fmt::Display for CentroidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidThreshold { threshold_fraction } => write!(
                f,
                "threshold fraction must lie in (0, 1], got {}",
                threshold_fraction
            ),
            Self::EmptyWindow { window, image_size } => write!(
                f,
                "window {}x{} at ({}, {}) does not overlap {}x{} image",
                window.width, window.height, window.x0, window.y0, image_size[0], image_size[1]
            ),
            Self::NoIntensity {
                window_max,
                threshold,
            } => write!(
                f,
                "no intensity left after thresholding at {} (window max {})",
                threshold, window_max
            ),
        }
    }
}

impl std::error::Error for CentroidError {}

/// Rectangular sub-window in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Leftmost column.
    pub x0: u32,
    /// Topmost row.
    pub y0: u32,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Window {
    /// Square of side `size` centered on the geometric center of a
    /// `width × height` image, clipped to the image.
    pub fn centered(image_width: u32, image_height: u32, size: u32) -> Self {
        let clip = |extent: u32| -> (u32, u32) {
            let start = (extent as f64 / 2.0 - size as f64 / 2.0).floor().max(0.0) as u32;
            let len = size.min(extent.saturating_sub(start));
            (start, len)
        };
        let (x0, width) = clip(image_width);
        let (y0, height) = clip(image_height);
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Intersection with a `width × height` image.
    fn clipped(&self, image_width: u32, image_height: u32) -> Self {
        let x1 = self.x0.saturating_add(self.width).min(image_width);
        let y1 = self.y0.saturating_add(self.height).min(image_height);
        Self {
            x0: self.x0.min(image_width),
            y0: self.y0.min(image_height),
            width: x1.saturating_sub(self.x0),
            height: y1.saturating_sub(self.y0),
        }
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Centroid estimation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CentroidConfig {
    /// Side of the square window around the image center, in pixels.
    pub window_size: u32,
    /// Pixels at or below `threshold_fraction · max(window)` are ignored.
    pub threshold_fraction: f64,
}

impl Default for CentroidConfig {
    fn default() -> Self {
        Self {
            window_size: 200,
            threshold_fraction: 0.5,
        }
    }
}

/// Raw image moments up to first order, in window-local coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageMoments {
    /// Total intensity.
    pub m00: f64,
    /// First moment along x (columns).
    pub m10: f64,
    /// First moment along y (rows).
    pub m01: f64,
}

impl ImageMoments {
    /// Moments of `window` keeping only pixels strictly above `threshold`.
    ///
    /// `window` must lie inside the image.
    pub fn thresholded<I: IntensityImage + ?Sized>(
        image: &I,
        window: &Window,
        threshold: f64,
    ) -> Self {
        let mut m = Self::default();
        for dy in 0..window.height {
            for dx in 0..window.width {
                let v = image.intensity(window.x0 + dx, window.y0 + dy);
                if v > threshold {
                    m.m00 += v;
                    m.m10 += dx as f64 * v;
                    m.m01 += dy as f64 * v;
                }
            }
        }
        m
    }

    /// `(M10/M00, M01/M00)`, or `None` if there is no mass.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        if self.m00 <= 0.0 || !self.m00.is_finite() {
            return None;
        }
        Some([self.m10 / self.m00, self.m01 / self.m00])
    }
}

/// Intensity centroid of a `window_size` square around the image center.
///
/// Returns `[x, y]` in full-image coordinates.
pub fn estimate_centroid<I: IntensityImage + ?Sized>(
    image: &I,
    window_size: u32,
    threshold_fraction: f64,
) -> Result<[f64; 2], CentroidError> {
    let (w, h) = image.dimensions();
    estimate_centroid_in_window(image, Window::centered(w, h, window_size), threshold_fraction)
}

/// Intensity centroid of an explicit window.
///
/// Pixels with intensity `<= threshold_fraction · max(window)` are zeroed
/// before the moments are taken. Returns `[x, y]` in full-image coordinates.
pub fn estimate_centroid_in_window<I: IntensityImage + ?Sized>(
    image: &I,
    window: Window,
    threshold_fraction: f64,
) -> Result<[f64; 2], CentroidError> {
    if !threshold_fraction.is_finite() || threshold_fraction <= 0.0 || threshold_fraction > 1.0 {
        return Err(CentroidError::InvalidThreshold { threshold_fraction });
    }

    let (w, h) = image.dimensions();
    let clipped = window.clipped(w, h);
    if clipped.is_empty() {
        return Err(CentroidError::EmptyWindow {
            window,
            image_size: [w, h],
        });
    }

    let mut window_max = f64::NEG_INFINITY;
    for y in clipped.y0..clipped.y0 + clipped.height {
        for x in clipped.x0..clipped.x0 + clipped.width {
            window_max = window_max.max(image.intensity(x, y));
        }
    }
    let threshold = threshold_fraction * window_max;

    let moments = ImageMoments::thresholded(image, &clipped, threshold);
    let Some([cx, cy]) = moments.centroid() else {
        return Err(CentroidError::NoIntensity {
            window_max,
            threshold,
        });
    };

    tracing::debug!(
        "centroid ({:.2}, {:.2}) from {}x{} window at ({}, {}), mass {:.1}",
        cx + clipped.x0 as f64,
        cy + clipped.y0 as f64,
        clipped.width,
        clipped.height,
        clipped.x0,
        clipped.y0,
        moments.m00
    );

    Ok([cx + clipped.x0 as f64, cy + clipped.y0 as f64])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{add_gaussian_noise, draw_ring_image};
    use image::{GrayImage, Luma};

    #[test]
    fn centered_window_is_clipped_to_image() {
        assert_eq!(
            Window::centered(100, 60, 40),
            Window {
                x0: 30,
                y0: 10,
                width: 40,
                height: 40
            }
        );
        assert_eq!(
            Window::centered(30, 20, 200),
            Window {
                x0: 0,
                y0: 0,
                width: 30,
                height: 20
            }
        );
    }

    #[test]
    fn thin_ring_centroid_is_ring_center() {
        let img = draw_ring_image(101, 101, [50.0, 50.0], 21.0, 19.0, 255, 0);
        let [x, y] = estimate_centroid(&img, 80, 0.5).unwrap();
        assert!((x - 50.0).abs() < 1.0, "x = {x}");
        assert!((y - 50.0).abs() < 1.0, "y = {y}");
    }

    #[test]
    fn off_center_ring_in_explicit_window() {
        let img = draw_ring_image(160, 120, [100.0, 45.0], 12.0, 9.0, 180, 0);
        let noisy = add_gaussian_noise(&img, 4.0, 7);
        let window = Window {
            x0: 70,
            y0: 15,
            width: 60,
            height: 60,
        };
        let [x, y] = estimate_centroid_in_window(&noisy, window, 0.5).unwrap();
        assert!((x - 100.0).abs() < 1.0, "x = {x}");
        assert!((y - 45.0).abs() < 1.0, "y = {y}");
    }

    #[test]
    fn single_bright_pixel_is_exact() {
        let mut img = GrayImage::new(20, 20);
        img.put_pixel(13, 4, Luma([9]));
        let [x, y] = estimate_centroid(&img, 20, 0.5).unwrap();
        assert_eq!([x, y], [13.0, 4.0]);
    }

    #[test]
    fn moments_of_explicit_window() {
        let mut img = GrayImage::new(10, 10);
        img.put_pixel(3, 2, Luma([10]));
        img.put_pixel(5, 2, Luma([30]));
        img.put_pixel(4, 4, Luma([5]));
        let window = Window {
            x0: 2,
            y0: 1,
            width: 6,
            height: 6,
        };
        let m = ImageMoments::thresholded(&img, &window, 5.0);
        // The pixel equal to the threshold is dropped.
        assert_eq!(m.m00, 40.0);
        assert_eq!(m.m10, 1.0 * 10.0 + 3.0 * 30.0);
        assert_eq!(m.m01, 1.0 * 10.0 + 1.0 * 30.0);
        assert_eq!(m.centroid(), Some([2.5, 1.0]));
        assert_eq!(ImageMoments::default().centroid(), None);
    }

    #[test]
    fn dark_window_reports_no_intensity() {
        let img = GrayImage::new(32, 32);
        let err = estimate_centroid(&img, 16, 0.5).unwrap_err();
        assert!(matches!(err, CentroidError::NoIntensity { .. }));
    }

    #[test]
    fn full_threshold_removes_everything() {
        let img = draw_ring_image(64, 64, [32.0, 32.0], 10.0, 8.0, 200, 0);
        let err = estimate_centroid(&img, 64, 1.0).unwrap_err();
        assert!(matches!(err, CentroidError::NoIntensity { .. }));
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let img = GrayImage::new(8, 8);
        for t in [0.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                estimate_centroid(&img, 8, t),
                Err(CentroidError::InvalidThreshold { .. })
            ));
        }
    }

    #[test]
    fn window_outside_image_is_rejected() {
        let img = GrayImage::new(8, 8);
        let window = Window {
            x0: 10,
            y0: 0,
            width: 4,
            height: 4,
        };
        assert!(matches!(
            estimate_centroid_in_window(&img, window, 0.5),
            Err(CentroidError::EmptyWindow { .. })
        ));
    }
}
