//! Center and radius estimation for ring patterns in intensity images.
//!
//! Typical inputs are diffraction rings on a 2D detector or any bright (or
//! dark) circular band on a background. The pipeline stages are:
//!
//! 1. **Seed** – a first circle estimate, from three picked points
//!    ([`fit_three_points`]), the intensity centroid of a central window
//!    ([`estimate_centroid`]) with a radius guess, or an external candidate.
//! 2. **Sample** – pixel indices along a candidate circle ([`sample_circle`]).
//! 3. **Score** – mean intensity or intensity variance along the circle
//!    ([`evaluate`]).
//! 4. **Refine** – derivative-free local search over center and radius with a
//!    regression guard against the seed ([`refine`]).
//!
//! # Public API
//! - [`CenterFinder`] as the primary entry point, configured by [`FinderConfig`]
//! - the stage functions above for callers that drive the pipeline themselves
//! - [`IntensityImage`] to plug in pixel sources other than `image` buffers
//!
//! Coordinates follow the image convention: `x` is the column, `y` the row,
//! origin at the top-left pixel.

mod centroid;
mod circle;
mod finder;
mod image_view;
mod objective;
mod refine;
mod sampling;
mod three_point;

#[cfg(test)]
pub(crate) mod test_utils;

pub use centroid::{
    estimate_centroid, estimate_centroid_in_window, CentroidConfig, CentroidError, ImageMoments,
    Window,
};
pub use circle::{CandidateError, CircleAdjustment, CircleCandidate};
pub use finder::{CenterFinder, FindResult, FinderConfig, FinderError, SeedStrategy};
pub use image_view::IntensityImage;
pub use objective::{evaluate, sample_intensities, ObjectiveKind, SampleError};
pub use refine::{refine, RefineConfig, RefineStatus, RefinementResult};
pub use sampling::{sample_circle, sample_circle_into, PixelIndex, DEFAULT_NUM_POINTS};
pub use three_point::{fit_three_points, DegenerateGeometry};
