use serde::{Deserialize, Serialize};

use crate::circle::CircleCandidate;
use crate::objective::ObjectiveKind;

/// Terminal state of the local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineStatus {
    /// Patience exhausted, or an iteration left the candidate unchanged.
    Converged,
    /// Iteration cap reached while still improving.
    MaxIterationsReached,
    /// The search did not beat the seed; the seed was returned.
    Regressed,
    /// The seed has a non-finite coordinate or a non-positive radius; no
    /// search was run.
    InvalidSeed,
}

/// Outcome of [`refine`](super::refine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementResult {
    /// Refined candidate, or the seed unchanged when `accepted` is false.
    pub candidate: CircleCandidate,
    /// `false` when the refinement failed to improve on the seed.
    pub accepted: bool,
    /// How the search terminated.
    pub status: RefineStatus,
    /// Objective used for the search.
    pub objective: ObjectiveKind,
    /// Iterations executed.
    pub iterations: usize,
    /// Objective at the seed; infinite if the seed samples outside the image.
    pub objective_initial: f64,
    /// Objective at the returned candidate.
    pub objective_final: f64,
    /// The axis-order guard swapped the refined coordinates.
    pub axes_swapped: bool,
}
