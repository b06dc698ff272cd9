use crate::circle::CircleCandidate;
use crate::image_view::IntensityImage;
use crate::objective::Evaluator;

use super::config::{stencil_offsets, RefineConfig};
use super::result::RefineStatus;

#[derive(Debug, Clone, Copy)]
pub(super) struct SearchOutcome {
    pub candidate: CircleCandidate,
    pub score: f64,
    pub iterations: usize,
    pub status: RefineStatus,
}

/// Coordinate-wise local search: one center-stencil move and one radius move
/// per iteration, each adopted only if strictly better.
///
/// Probes that sample outside the image score as the objective's worst value
/// and can never be selected.
pub(super) fn local_search<I: IntensityImage + ?Sized>(
    evaluator: &mut Evaluator<'_, I>,
    seed: CircleCandidate,
    seed_score: f64,
    config: &RefineConfig,
) -> SearchOutcome {
    let kind = evaluator.kind();
    let center_offsets = stencil_offsets(config.center_step_px, config.center_span_px);
    let radius_offsets = stencil_offsets(config.radius_step_px, config.radius_span_px);
    let patience = config.patience_for(kind);

    let mut best = seed;
    let mut best_score = seed_score;
    let mut stale = 0usize;
    let mut iterations = 0usize;

    while iterations < config.max_iterations {
        iterations += 1;
        let before = best_score;
        let mut moved = false;

        if let Some((cand, score)) = best_center_probe(evaluator, best, &center_offsets) {
            if kind.better(score, best_score) {
                best = cand;
                best_score = score;
                moved = true;
            }
        }

        if let Some((cand, score)) =
            best_radius_probe(evaluator, best, &radius_offsets, config.min_radius_px)
        {
            if kind.better(score, best_score) {
                best = cand;
                best_score = score;
                moved = true;
            }
        }

        tracing::debug!(
            "{} iter {}: ({:.3}, {:.3}, {:.3}) objective {:.6} -> {:.6}",
            kind,
            iterations,
            best.x,
            best.y,
            best.r,
            before,
            best_score
        );

        // Nothing moved: the next iteration would probe the same stencil.
        if !moved {
            return SearchOutcome {
                candidate: best,
                score: best_score,
                iterations,
                status: RefineStatus::Converged,
            };
        }

        let improvement = (best_score - before).abs();
        if improvement < config.convergence_fraction * before.abs() {
            stale += 1;
        } else {
            stale = 0;
        }
        if stale >= patience {
            return SearchOutcome {
                candidate: best,
                score: best_score,
                iterations,
                status: RefineStatus::Converged,
            };
        }
    }

    SearchOutcome {
        candidate: best,
        score: best_score,
        iterations,
        status: RefineStatus::MaxIterationsReached,
    }
}

/// Best valid `(x + dx, y + dy, r)` over the stencil, excluding the origin.
fn best_center_probe<I: IntensityImage + ?Sized>(
    evaluator: &mut Evaluator<'_, I>,
    current: CircleCandidate,
    offsets: &[f64],
) -> Option<(CircleCandidate, f64)> {
    let kind = evaluator.kind();
    let mut best: Option<(CircleCandidate, f64)> = None;
    for &dy in offsets {
        for &dx in offsets {
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            let probe = current.with_center(current.x + dx, current.y + dy);
            let score = evaluator.score(&probe);
            if !score.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, s)| kind.better(score, s)) {
                best = Some((probe, score));
            }
        }
    }
    best
}

/// Best valid `(x, y, r + dr)`, skipping radii below `min_radius`.
fn best_radius_probe<I: IntensityImage + ?Sized>(
    evaluator: &mut Evaluator<'_, I>,
    current: CircleCandidate,
    offsets: &[f64],
    min_radius: f64,
) -> Option<(CircleCandidate, f64)> {
    let kind = evaluator.kind();
    let floor = min_radius.max(f64::MIN_POSITIVE);
    let mut best: Option<(CircleCandidate, f64)> = None;
    for &dr in offsets {
        let r = current.r + dr;
        if dr == 0.0 || r < floor {
            continue;
        }
        let probe = current.with_radius(r);
        let score = evaluator.score(&probe);
        if !score.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, s)| kind.better(score, s)) {
            best = Some((probe, score));
        }
    }
    best
}
