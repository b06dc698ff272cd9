//! Scalar fitness of a circle candidate from circumference intensities.

use serde::{Deserialize, Serialize};

use crate::circle::{CandidateError, CircleCandidate};
use crate::image_view::IntensityImage;
use crate::sampling::{sample_circle_into, PixelIndex};

/// A circumference sample fell outside the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleError {
    /// Sample index outside `[0, rows) × [0, cols)`.
    OutOfBounds {
        /// Offending pixel index.
        index: PixelIndex,
        /// Image size `[width, height]`.
        image_size: [u32; 2],
    },
    /// Zero samples requested, so no statistic exists.
    NoSamples,
    /// The candidate has a non-finite coordinate or a non-positive radius.
    InvalidCandidate(CandidateError),
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds { index, image_size } => write!(
                f,
                "circle sample (row {}, col {}) outside {}x{} image",
                index.row, index.col, image_size[0], image_size[1]
            ),
            Self::NoSamples => write!(f, "no circumference samples requested"),
            Self::InvalidCandidate(e) => write!(f, "invalid circle candidate: {}", e),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidCandidate(e) => Some(e),
            _ => None,
        }
    }
}

/// How sampled circumference intensities reduce to one fitness value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Mean intensity; larger is better (bright ring under the circle).
    Sum,
    /// Intensity variance; smaller is better (circle stays on the ring).
    Variance,
}

impl ObjectiveKind {
    /// `true` when `a` is strictly better than `b` for this objective.
    #[inline]
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Self::Sum => a > b,
            Self::Variance => a < b,
        }
    }

    /// Score that every valid evaluation beats.
    #[inline]
    pub fn worst(self) -> f64 {
        match self {
            Self::Sum => f64::NEG_INFINITY,
            Self::Variance => f64::INFINITY,
        }
    }

    /// Default no-improvement patience of the local search.
    pub fn default_patience(self) -> usize {
        match self {
            Self::Sum => 25,
            Self::Variance => 5,
        }
    }

    fn reduce(self, values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        match self {
            Self::Sum => mean,
            Self::Variance => values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n,
        }
    }
}

impl std::fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::Variance => write!(f, "variance"),
        }
    }
}

/// Evaluate `kind` for `candidate` using `num_points` circumference samples.
///
/// Fails with [`SampleError::OutOfBounds`] as soon as one sample lies outside
/// the image; indices are never clamped. Candidates breaking the
/// finite/positive-radius invariant fail with [`SampleError::InvalidCandidate`].
pub fn evaluate<I: IntensityImage + ?Sized>(
    image: &I,
    candidate: &CircleCandidate,
    kind: ObjectiveKind,
    num_points: usize,
) -> Result<f64, SampleError> {
    Evaluator::new(image, kind, num_points).evaluate(candidate)
}

/// Gather the raw circumference intensities for `candidate`.
pub fn sample_intensities<I: IntensityImage + ?Sized>(
    image: &I,
    candidate: &CircleCandidate,
    num_points: usize,
) -> Result<Vec<f64>, SampleError> {
    let mut idx = Vec::with_capacity(num_points);
    let mut values = Vec::with_capacity(num_points);
    gather(image, candidate, num_points, &mut idx, &mut values)?;
    Ok(values)
}

fn gather<I: IntensityImage + ?Sized>(
    image: &I,
    candidate: &CircleCandidate,
    num_points: usize,
    idx: &mut Vec<PixelIndex>,
    values: &mut Vec<f64>,
) -> Result<(), SampleError> {
    candidate.validate().map_err(SampleError::InvalidCandidate)?;
    if num_points == 0 {
        return Err(SampleError::NoSamples);
    }
    sample_circle_into(candidate.x, candidate.y, candidate.r, num_points, idx);
    values.clear();
    for &index in idx.iter() {
        let Some(v) = image.intensity_checked(index.col, index.row) else {
            let (w, h) = image.dimensions();
            return Err(SampleError::OutOfBounds {
                index,
                image_size: [w, h],
            });
        };
        values.push(v);
    }
    Ok(())
}

/// Evaluator with sample buffers reused across probes.
pub(crate) struct Evaluator<'a, I: ?Sized> {
    image: &'a I,
    kind: ObjectiveKind,
    num_points: usize,
    idx: Vec<PixelIndex>,
    values: Vec<f64>,
}

impl<'a, I: IntensityImage + ?Sized> Evaluator<'a, I> {
    pub(crate) fn new(image: &'a I, kind: ObjectiveKind, num_points: usize) -> Self {
        Self {
            image,
            kind,
            num_points,
            idx: Vec::with_capacity(num_points),
            values: Vec::with_capacity(num_points),
        }
    }

    pub(crate) fn kind(&self) -> ObjectiveKind {
        self.kind
    }

    pub(crate) fn evaluate(&mut self, candidate: &CircleCandidate) -> Result<f64, SampleError> {
        gather(
            self.image,
            candidate,
            self.num_points,
            &mut self.idx,
            &mut self.values,
        )?;
        Ok(self.kind.reduce(&self.values))
    }

    /// Objective value, or the worst score when the candidate samples
    /// outside the image.
    pub(crate) fn score(&mut self, candidate: &CircleCandidate) -> f64 {
        match self.evaluate(candidate) {
            Ok(v) if v.is_finite() => v,
            Ok(_) => self.kind.worst(),
            Err(e) => {
                tracing::trace!(
                    "probe ({:.2}, {:.2}, {:.2}) invalid: {}",
                    candidate.x,
                    candidate.y,
                    candidate.r,
                    e
                );
                self.kind.worst()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_ring_image;
    use approx::assert_abs_diff_eq;
    use image::{GrayImage, Luma};

    fn ring() -> GrayImage {
        draw_ring_image(100, 100, [50.0, 50.0], 21.5, 18.5, 200, 0)
    }

    #[test]
    fn comparator_direction_follows_kind() {
        assert!(ObjectiveKind::Sum.better(2.0, 1.0));
        assert!(!ObjectiveKind::Sum.better(1.0, 1.0));
        assert!(ObjectiveKind::Variance.better(1.0, 2.0));
        assert!(!ObjectiveKind::Variance.better(1.0, 1.0));
        assert!(ObjectiveKind::Sum.better(0.0, ObjectiveKind::Sum.worst()));
        assert!(ObjectiveKind::Variance.better(1e300, ObjectiveKind::Variance.worst()));
    }

    #[test]
    fn mean_and_variance_of_uniform_image() {
        let img = GrayImage::from_pixel(40, 40, Luma([30]));
        let c = CircleCandidate::new(20.0, 20.0, 10.0).unwrap();
        assert_abs_diff_eq!(evaluate(&img, &c, ObjectiveKind::Sum, 360).unwrap(), 30.0);
        assert_abs_diff_eq!(evaluate(&img, &c, ObjectiveKind::Variance, 360).unwrap(), 0.0);
    }

    #[test]
    fn mean_is_independent_of_sample_count() {
        let img = ring();
        let c = CircleCandidate::new(50.0, 50.0, 20.0).unwrap();
        let m90 = evaluate(&img, &c, ObjectiveKind::Sum, 90).unwrap();
        let m720 = evaluate(&img, &c, ObjectiveKind::Sum, 720).unwrap();
        assert_abs_diff_eq!(m90, 200.0);
        assert_abs_diff_eq!(m720, 200.0);
    }

    #[test]
    fn variance_is_lowest_on_the_ring() {
        let img = ring();
        let on = CircleCandidate::new(50.0, 50.0, 20.0).unwrap();
        let off = CircleCandidate::new(55.0, 50.0, 20.0).unwrap();
        let v_on = evaluate(&img, &on, ObjectiveKind::Variance, 360).unwrap();
        let v_off = evaluate(&img, &off, ObjectiveKind::Variance, 360).unwrap();
        assert!(v_on < v_off, "on-ring variance {v_on} should beat {v_off}");
    }

    #[test]
    fn population_variance_of_half_bright_circle() {
        // Left half 0, right half 100: every sample is one of the two levels.
        let mut img = GrayImage::new(40, 40);
        for y in 0..40 {
            for x in 20..40 {
                img.put_pixel(x, y, Luma([100]));
            }
        }
        let values =
            sample_intensities(&img, &CircleCandidate::new(20.5, 20.5, 10.0).unwrap(), 360)
                .unwrap();
        let bright = values.iter().filter(|&&v| v == 100.0).count() as f64;
        let p = bright / values.len() as f64;
        let expected = 100.0 * 100.0 * p * (1.0 - p);
        let got = evaluate(
            &img,
            &CircleCandidate::new(20.5, 20.5, 10.0).unwrap(),
            ObjectiveKind::Variance,
            360,
        )
        .unwrap();
        assert_abs_diff_eq!(got, expected, epsilon = 1e-9);
    }

    #[test]
    fn out_of_bounds_sample_is_an_error() {
        let img = ring();
        let c = CircleCandidate::new(10.0, 50.0, 20.0).unwrap();
        let err = evaluate(&img, &c, ObjectiveKind::Sum, 360).unwrap_err();
        assert!(matches!(err, SampleError::OutOfBounds { image_size: [100, 100], .. }));

        let c = CircleCandidate::new(85.0, 50.0, 20.0).unwrap();
        assert!(evaluate(&img, &c, ObjectiveKind::Variance, 360).is_err());
    }

    #[test]
    fn zero_samples_is_an_error() {
        let img = ring();
        let c = CircleCandidate::new(50.0, 50.0, 20.0).unwrap();
        assert_eq!(
            evaluate(&img, &c, ObjectiveKind::Sum, 0),
            Err(SampleError::NoSamples)
        );
    }

    #[test]
    fn invalid_candidates_are_errors_not_values() {
        let img = ring();
        let nan_center = CircleCandidate {
            x: f64::NAN,
            y: 50.0,
            r: 20.0,
        };
        assert!(matches!(
            evaluate(&img, &nan_center, ObjectiveKind::Sum, 360),
            Err(SampleError::InvalidCandidate(CandidateError::NonFinite { .. }))
        ));

        let negative = CircleCandidate {
            x: 50.0,
            y: 50.0,
            r: -20.0,
        };
        let err = evaluate(&img, &negative, ObjectiveKind::Variance, 360).unwrap_err();
        assert_eq!(
            err,
            SampleError::InvalidCandidate(CandidateError::NonPositiveRadius { r: -20.0 })
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(sample_intensities(&img, &negative, 360).is_err());

        let mut ev = Evaluator::new(&img, ObjectiveKind::Variance, 360);
        assert_eq!(ev.score(&negative), f64::INFINITY);
    }

    #[test]
    fn score_maps_invalid_probes_to_worst() {
        let img = ring();
        let mut ev = Evaluator::new(&img, ObjectiveKind::Variance, 360);
        let bad = CircleCandidate::new(-5.0, 50.0, 20.0).unwrap();
        assert_eq!(ev.score(&bad), f64::INFINITY);
        let mut ev = Evaluator::new(&img, ObjectiveKind::Sum, 360);
        assert_eq!(ev.score(&bad), f64::NEG_INFINITY);
    }
}
