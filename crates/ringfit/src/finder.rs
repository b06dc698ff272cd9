//! High-level center finding API.
//!
//! [`CenterFinder`] is the primary entry point. It wraps a [`FinderConfig`],
//! resolves a [`SeedStrategy`] into a first circle estimate and optionally
//! refines it against the image.

use serde::{Deserialize, Serialize};

use crate::centroid::{estimate_centroid, CentroidConfig, CentroidError};
use crate::circle::{CandidateError, CircleCandidate};
use crate::image_view::IntensityImage;
use crate::objective::ObjectiveKind;
use crate::refine::{refine, RefineConfig, RefinementResult};
use crate::three_point::{fit_three_points, DegenerateGeometry};

/// How the first circle estimate is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// Circle through three picked points, each `[x, y]`.
    ThreePoints([[f64; 2]; 3]),
    /// Intensity centroid of the central window, paired with a radius guess.
    Centroid {
        /// Radius to pair with the centroid.
        radius: f64,
    },
    /// Seed produced elsewhere, e.g. by a Hough circle transform.
    External(CircleCandidate),
}

/// Errors while producing a seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FinderError {
    /// Three-point fit failed.
    Geometry(DegenerateGeometry),
    /// Centroid estimation failed.
    Centroid(CentroidError),
    /// The resulting or supplied candidate is invalid.
    Candidate(CandidateError),
}

impl std::fmt::Display for FinderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geometry(e) => write!(f, "three-point seed failed: {}", e),
            Self::Centroid(e) => write!(f, "centroid seed failed: {}", e),
            Self::Candidate(e) => write!(f, "invalid seed: {}", e),
        }
    }
}

impl std::error::Error for FinderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::Centroid(e) => Some(e),
            Self::Candidate(e) => Some(e),
        }
    }
}

impl From<DegenerateGeometry> for FinderError {
    fn from(e: DegenerateGeometry) -> Self {
        Self::Geometry(e)
    }
}

impl From<CentroidError> for FinderError {
    fn from(e: CentroidError) -> Self {
        Self::Centroid(e)
    }
}

impl From<CandidateError> for FinderError {
    fn from(e: CandidateError) -> Self {
        Self::Candidate(e)
    }
}

/// Top-level configuration for [`CenterFinder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Centroid window and threshold for [`SeedStrategy::Centroid`].
    pub centroid: CentroidConfig,
    /// Objective used to refine the seed; `None` skips refinement.
    pub objective: Option<ObjectiveKind>,
    /// Local-search parameters.
    pub refine: RefineConfig,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            centroid: CentroidConfig::default(),
            objective: Some(ObjectiveKind::Variance),
            refine: RefineConfig::default(),
        }
    }
}

/// Outcome of [`CenterFinder::find`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindResult {
    /// Seed produced by the strategy.
    pub seed: CircleCandidate,
    /// Final estimate: the refined candidate when refinement was accepted,
    /// the seed otherwise.
    pub circle: CircleCandidate,
    /// Refinement details, if refinement ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement: Option<RefinementResult>,
}

/// Primary center-finding interface.
///
/// Create once, run on many images. Holds no per-image state.
///
/// # Examples
///
/// ```
/// use image::GrayImage;
/// use ringfit::{CenterFinder, CircleCandidate, SeedStrategy};
///
/// let finder = CenterFinder::default();
/// let image = GrayImage::new(64, 64);
/// let seed = CircleCandidate::new(32.0, 32.0, 10.0).unwrap();
/// let result = finder.find(&image, &SeedStrategy::External(seed)).unwrap();
/// assert_eq!(result.circle, seed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CenterFinder {
    config: FinderConfig,
}

impl CenterFinder {
    /// Create with full config control.
    pub fn with_config(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut FinderConfig {
        &mut self.config
    }

    /// Resolve `strategy` into a seed candidate.
    pub fn seed<I: IntensityImage + ?Sized>(
        &self,
        image: &I,
        strategy: &SeedStrategy,
    ) -> Result<CircleCandidate, FinderError> {
        let seed = match *strategy {
            SeedStrategy::ThreePoints([p0, p1, p2]) => fit_three_points(p0, p1, p2)?,
            SeedStrategy::Centroid { radius } => {
                let cfg = &self.config.centroid;
                let [x, y] = estimate_centroid(image, cfg.window_size, cfg.threshold_fraction)?;
                CircleCandidate::new(x, y, radius)?
            }
            SeedStrategy::External(c) => CircleCandidate::new(c.x, c.y, c.r)?,
        };
        tracing::debug!("seed ({:.3}, {:.3}, {:.3})", seed.x, seed.y, seed.r);
        Ok(seed)
    }

    /// Seed, then refine with the configured objective (if any).
    pub fn find<I: IntensityImage + ?Sized>(
        &self,
        image: &I,
        strategy: &SeedStrategy,
    ) -> Result<FindResult, FinderError> {
        let seed = self.seed(image, strategy)?;
        Ok(self.find_from_seed(image, seed))
    }

    /// Refine an already resolved (and possibly hand-adjusted) seed.
    pub fn find_from_seed<I: IntensityImage + ?Sized>(
        &self,
        image: &I,
        seed: CircleCandidate,
    ) -> FindResult {
        let Some(kind) = self.config.objective else {
            return FindResult {
                seed,
                circle: seed,
                refinement: None,
            };
        };

        let refinement = refine(image, seed, kind, &self.config.refine);
        FindResult {
            seed,
            circle: refinement.candidate,
            refinement: Some(refinement),
        }
    }
}
