//! Closed-form circle through three points.
//!
//! The circumcenter is the barycentric combination of the vertices with
//! weights `a(b+c-a)`, `b(c+a-b)`, `c(a+b-c)` where `a, b, c` are squared
//! side lengths opposite each vertex. The radius is `abc / (4·area)` with the
//! area from Heron's formula.

use nalgebra::Vector2;

use crate::circle::CircleCandidate;

/// Relative tolerance on the weight sum, which scales with `length⁴`.
const COLLINEAR_REL_EPS: f64 = 1e-12;

/// Three points do not define a unique circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegenerateGeometry {
    /// Points are collinear (or coincide): the barycentric weights sum to 0.
    Collinear {
        /// Weight sum `s = wa + wb + wc`.
        weight_sum: f64,
    },
    /// One Heron factor is not positive, so the triangle has no area.
    NonPositiveHeronFactor {
        /// Index of the failing factor in
        /// `[(A+B+C), (-A+B+C), (A-B+C), (A+B-C)]` with `A = √a` etc.
        factor: usize,
        /// Its value.
        value: f64,
    },
    /// Input coordinates or the resulting circle are not finite.
    NonFinite,
}

impl std::fmt::Display for DegenerateGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collinear { weight_sum } => {
                write!(f, "points are collinear (weight sum {:e})", weight_sum)
            }
            Self::NonPositiveHeronFactor { factor, value } => {
                write!(f, "degenerate triangle: Heron factor {} = {:e}", factor, value)
            }
            Self::NonFinite => write!(f, "non-finite point or circle parameters"),
        }
    }
}

impl std::error::Error for DegenerateGeometry {}

/// Fit the unique circle through `p0`, `p1`, `p2` (each `[x, y]`).
///
/// Collinear or coincident points are rejected; callers should request a
/// different triple instead of retrying.
pub fn fit_three_points(
    p0: [f64; 2],
    p1: [f64; 2],
    p2: [f64; 2],
) -> Result<CircleCandidate, DegenerateGeometry> {
    let pts = [p0, p1, p2].map(|p| Vector2::new(p[0], p[1]));
    if pts.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(DegenerateGeometry::NonFinite);
    }

    let a = (pts[1] - pts[2]).norm_squared();
    let b = (pts[2] - pts[0]).norm_squared();
    let c = (pts[0] - pts[1]).norm_squared();

    let wa = a * (b + c - a);
    let wb = b * (c + a - b);
    let wc = c * (a + b - c);
    let s = wa + wb + wc;

    let scale = (a + b + c) * (a + b + c);
    if s == 0.0 || s.abs() <= COLLINEAR_REL_EPS * scale {
        return Err(DegenerateGeometry::Collinear { weight_sum: s });
    }

    let center = (pts[0] * wa + pts[1] * wb + pts[2] * wc) / s;

    let (sa, sb, sc) = (a.sqrt(), b.sqrt(), c.sqrt());
    let factors = [
        sa + sb + sc,
        -sa + sb + sc,
        sa - sb + sc,
        sa + sb - sc,
    ];
    if let Some((factor, &value)) = factors.iter().enumerate().find(|&(_, &v)| v <= 0.0) {
        return Err(DegenerateGeometry::NonPositiveHeronFactor { factor, value });
    }
    let r = (sa * sb * sc) / factors.iter().product::<f64>().sqrt();

    CircleCandidate::new(center.x, center.y, r).map_err(|_| DegenerateGeometry::NonFinite)
}
