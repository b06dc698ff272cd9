//! Circle candidate type and message-style manual adjustments.

use serde::{Deserialize, Serialize};

/// Errors raised when a circle candidate would violate its invariants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateError {
    /// Center or radius is NaN or infinite.
    NonFinite {
        /// Offending `[x, y, r]`.
        xyr: [f64; 3],
    },
    /// Radius is zero or negative.
    NonPositiveRadius {
        /// Offending radius.
        r: f64,
    },
}

impl std::fmt::Display for CandidateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { xyr } => write!(
                f,
                "circle parameters must be finite, got ({}, {}, {})",
                xyr[0], xyr[1], xyr[2]
            ),
            Self::NonPositiveRadius { r } => {
                write!(f, "circle radius must be positive, got {}", r)
            }
        }
    }
}

impl std::error::Error for CandidateError {}

/// Circle center and radius in image pixel units.
///
/// `x` is the column coordinate and `y` the row coordinate. Deserialization
/// goes through [`CircleCandidate::new`]; values built from the public fields
/// directly can be checked with [`CircleCandidate::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCircle")]
pub struct CircleCandidate {
    /// Center column.
    pub x: f64,
    /// Center row.
    pub y: f64,
    /// Radius (> 0).
    pub r: f64,
}

impl CircleCandidate {
    /// Build a candidate, rejecting non-finite values and `r <= 0`.
    pub fn new(x: f64, y: f64, r: f64) -> Result<Self, CandidateError> {
        if !(x.is_finite() && y.is_finite() && r.is_finite()) {
            return Err(CandidateError::NonFinite { xyr: [x, y, r] });
        }
        if r <= 0.0 {
            return Err(CandidateError::NonPositiveRadius { r });
        }
        Ok(Self { x, y, r })
    }

    /// Re-check the invariants of a candidate assembled field by field.
    pub fn validate(&self) -> Result<(), CandidateError> {
        Self::new(self.x, self.y, self.r).map(|_| ())
    }

    /// Center as `[x, y]`.
    #[inline]
    pub fn center(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Same radius, new center. Used by the search stencil, which never
    /// touches the radius.
    #[inline]
    pub(crate) fn with_center(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }

    /// Same center, new radius. Callers keep `r > 0`.
    #[inline]
    pub(crate) fn with_radius(self, r: f64) -> Self {
        Self { r, ..self }
    }

    /// Apply one manual adjustment and return the resulting candidate.
    ///
    /// The receiver is left untouched; an adjustment that would break the
    /// candidate invariants is rejected rather than clamped.
    pub fn adjusted(&self, adjustment: CircleAdjustment) -> Result<Self, CandidateError> {
        match adjustment {
            CircleAdjustment::Translate { dx, dy } => Self::new(self.x + dx, self.y + dy, self.r),
            CircleAdjustment::Resize { dr } => Self::new(self.x, self.y, self.r + dr),
            CircleAdjustment::Replace(c) => Self::new(c.x, c.y, c.r),
        }
    }
}

#[derive(Deserialize)]
struct RawCircle {
    x: f64,
    y: f64,
    r: f64,
}

impl TryFrom<RawCircle> for CircleCandidate {
    type Error = CandidateError;

    fn try_from(raw: RawCircle) -> Result<Self, Self::Error> {
        Self::new(raw.x, raw.y, raw.r)
    }
}

/// Manual adjustment message sent by an interactive front end.
///
/// A UI maps key presses or drags onto these messages and feeds them to
/// [`CircleCandidate::adjusted`]; the numeric core holds no UI state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircleAdjustment {
    /// Shift the center by `(dx, dy)` pixels.
    Translate { dx: f64, dy: f64 },
    /// Grow (positive) or shrink (negative) the radius.
    Resize { dr: f64 },
    /// Replace the candidate wholesale, e.g. after a fresh three-point pick.
    Replace(CircleCandidate),
}
