//! Circumference sampling in integer pixel coordinates.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Default number of circumference samples.
pub const DEFAULT_NUM_POINTS: usize = 360;

/// Integer pixel index produced by the circle sampler.
///
/// Indices are signed: a circle reaching past the top or left image border
/// yields negative values, which evaluation reports as out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelIndex {
    /// Row index (`y`).
    pub row: i64,
    /// Column index (`x`).
    pub col: i64,
}

/// Sample `num_points` positions evenly spaced around a circle.
///
/// Angles are `θ_k = 2πk / num_points` for `k in 0..num_points`, so `2π`
/// itself is excluded and no angle is visited twice. Each point
/// `(x + r·cosθ, y + r·sinθ)` is truncated towards negative infinity, which
/// matches plain truncation for in-image coordinates. Non-finite
/// coordinates map to `i64::MIN` so they can never pass a bounds check.
///
/// No clipping is applied; callers must bounds-check.
pub fn sample_circle(x: f64, y: f64, r: f64, num_points: usize) -> Vec<PixelIndex> {
    let mut out = Vec::with_capacity(num_points);
    sample_circle_into(x, y, r, num_points, &mut out);
    out
}

/// Buffer-reusing variant of [`sample_circle`]; `out` is cleared first.
pub fn sample_circle_into(x: f64, y: f64, r: f64, num_points: usize, out: &mut Vec<PixelIndex>) {
    out.clear();
    if num_points == 0 {
        return;
    }
    let step = TAU / num_points as f64;
    out.extend((0..num_points).map(|k| {
        let (s, c) = (k as f64 * step).sin_cos();
        PixelIndex {
            row: to_index(y + r * s),
            col: to_index(x + r * c),
        }
    }));
}

#[inline]
fn to_index(v: f64) -> i64 {
    if v.is_finite() {
        v.floor() as i64
    } else {
        i64::MIN
    }
}
