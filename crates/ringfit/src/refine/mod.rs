//! Derivative-free refinement of a circle candidate against pixel data.
//!
//! Starting from a seed `(x, y, r)`, each iteration probes a small stencil
//! of center offsets and then a set of radius offsets, adopting a probe only
//! when it strictly improves the objective (mean intensity for
//! [`ObjectiveKind::Sum`], intensity variance for
//! [`ObjectiveKind::Variance`]). The search stops once improvements stay
//! below a fraction of the objective for `patience` iterations, when an
//! iteration moves nothing, or at the iteration cap.
//!
//! A final regression check compares the rounded objective of the result
//! against the seed's and falls back to the seed unless it is strictly
//! better.

mod config;
mod policy;
mod result;
mod search;

pub use config::RefineConfig;
pub use result::{RefineStatus, RefinementResult};

use crate::circle::CircleCandidate;
use crate::image_view::IntensityImage;
use crate::objective::{Evaluator, ObjectiveKind};

use policy::{axis_order_corrected, improves_on_seed};
use search::local_search;

/// Refine `seed` against `image` using the `kind` objective.
///
/// Never fails: probes that sample outside the image are skipped, and a
/// search that cannot beat the seed returns it with `accepted == false`.
/// A seed violating the candidate invariants is returned untouched with
/// status [`RefineStatus::InvalidSeed`].
pub fn refine<I: IntensityImage + ?Sized>(
    image: &I,
    seed: CircleCandidate,
    kind: ObjectiveKind,
    config: &RefineConfig,
) -> RefinementResult {
    if let Err(e) = seed.validate() {
        tracing::warn!("refusing to refine invalid seed: {}", e);
        return RefinementResult {
            candidate: seed,
            accepted: false,
            status: RefineStatus::InvalidSeed,
            objective: kind,
            iterations: 0,
            objective_initial: kind.worst(),
            objective_final: kind.worst(),
            axes_swapped: false,
        };
    }

    let mut evaluator = Evaluator::new(image, kind, config.num_points);
    let objective_initial = evaluator.score(&seed);

    let outcome = local_search(&mut evaluator, seed, objective_initial, config);
    let mut candidate = outcome.candidate;
    let mut objective_final = outcome.score;

    let mut axes_swapped = false;
    if config.axis_order_guard {
        if let Some(swapped) = axis_order_corrected(&seed, &candidate) {
            tracing::warn!(
                "axis order flipped during refinement; swapping ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                candidate.x,
                candidate.y,
                swapped.x,
                swapped.y
            );
            candidate = swapped;
            objective_final = evaluator.score(&candidate);
            axes_swapped = true;
        }
    }

    if !improves_on_seed(kind, objective_initial, objective_final, config.round_decimals) {
        tracing::warn!(
            "{} refinement did not improve on seed ({:.3}, {:.3}, {:.3}): {:.6} vs {:.6}; keeping seed",
            kind,
            seed.x,
            seed.y,
            seed.r,
            objective_final,
            objective_initial
        );
        return RefinementResult {
            candidate: seed,
            accepted: false,
            status: RefineStatus::Regressed,
            objective: kind,
            iterations: outcome.iterations,
            objective_initial,
            objective_final: objective_initial,
            axes_swapped,
        };
    }

    tracing::info!(
        "{} refinement {:?} after {} iterations: ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3}), objective {:.6} -> {:.6}",
        kind,
        outcome.status,
        outcome.iterations,
        seed.x,
        seed.y,
        seed.r,
        candidate.x,
        candidate.y,
        candidate.r,
        objective_initial,
        objective_final
    );

    RefinementResult {
        candidate,
        accepted: true,
        status: outcome.status,
        objective: kind,
        iterations: outcome.iterations,
        objective_initial,
        objective_final,
        axes_swapped,
    }
}
