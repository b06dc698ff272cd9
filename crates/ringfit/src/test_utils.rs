//! Synthetic ring images shared by unit tests.

use image::{GrayImage, ImageBuffer, Luma};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Hard-edged ring: `ring_pix` where the pixel's integer coordinate lies
/// within `[inner_radius, outer_radius]` of `center`, `bg_pix` elsewhere.
pub(crate) fn draw_ring_image(
    w: u32,
    h: u32,
    center: [f64; 2],
    outer_radius: f64,
    inner_radius: f64,
    ring_pix: u8,
    bg_pix: u8,
) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let d = (x as f64 - center[0]).hypot(y as f64 - center[1]);
        Luma([if (inner_radius..=outer_radius).contains(&d) {
            ring_pix
        } else {
            bg_pix
        }])
    })
}

/// Render a ring with a Gaussian radial profile peaking at `radius`.
///
/// Intensity is `peak · exp(-(d - radius)² / 2σ²)` with `d` the distance of
/// the pixel's integer coordinate from `center`, on a zero background.
pub(crate) fn draw_gaussian_ring_image(
    w: u32,
    h: u32,
    center: [f64; 2],
    radius: f64,
    sigma: f64,
    peak: f64,
) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let d = (x as f64 - center[0]).hypot(y as f64 - center[1]);
        let v = peak * (-(d - radius).powi(2) / (2.0 * sigma * sigma)).exp();
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Add zero-mean Gaussian noise with a fixed seed, saturating to `[0, 255]`.
pub(crate) fn add_gaussian_noise(img: &GrayImage, sigma: f64, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sigma).expect("valid sigma");
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let v = p[0] as f64 + noise.sample(&mut rng);
        p[0] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Blur with `imageproc`'s float Gaussian, going through a `[0, 1]` image.
pub(crate) fn blur_gray(img: &GrayImage, sigma: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let unit = ImageBuffer::<Luma<f32>, Vec<f32>>::from_fn(w, h, |x, y| {
        Luma([img.get_pixel(x, y)[0] as f32 / 255.0])
    });
    let blurred = imageproc::filter::gaussian_blur_f32(&unit, sigma);
    GrayImage::from_fn(w, h, |x, y| {
        let v = blurred.get_pixel(x, y)[0].clamp(0.0, 1.0);
        Luma([(v * 255.0).round() as u8])
    })
}
