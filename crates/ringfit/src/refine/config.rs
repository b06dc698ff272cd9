use serde::{Deserialize, Serialize};

use crate::objective::ObjectiveKind;
use crate::sampling::DEFAULT_NUM_POINTS;

/// Configuration for local-search circle refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    /// Circumference samples per objective evaluation.
    pub num_points: usize,
    /// Grid step of the center stencil, in pixels.
    pub center_step_px: f64,
    /// Half-extent of the center stencil: offsets span `[-span, +span]`.
    pub center_span_px: f64,
    /// Grid step of the radius probes, in pixels.
    pub radius_step_px: f64,
    /// Half-extent of the radius probes.
    pub radius_span_px: f64,
    /// Radius probes below this value are skipped.
    pub min_radius_px: f64,
    /// An iteration whose objective change is below
    /// `convergence_fraction · |objective|` counts as no improvement.
    pub convergence_fraction: f64,
    /// Consecutive no-improvement iterations before stopping.
    ///
    /// `None` uses [`ObjectiveKind::default_patience`].
    pub patience: Option<usize>,
    /// Hard cap on iterations.
    pub max_iterations: usize,
    /// Decimal places kept when comparing the final objective against the
    /// seed's in the regression check.
    pub round_decimals: u32,
    /// Swap the refined `x`/`y` back when their ordering flipped relative to
    /// the seed.
    ///
    /// This is a heuristic for callers that mix row/column conventions
    /// between seed sources. It has no geometric justification and is off by
    /// default.
    pub axis_order_guard: bool,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            center_step_px: 0.25,
            center_span_px: 1.0,
            radius_step_px: 0.25,
            radius_span_px: 1.0,
            min_radius_px: 1.0,
            convergence_fraction: 0.05,
            patience: None,
            max_iterations: 200,
            round_decimals: 6,
            axis_order_guard: false,
        }
    }
}

impl RefineConfig {
    /// Patience in effect for `kind`.
    pub fn patience_for(&self, kind: ObjectiveKind) -> usize {
        self.patience.unwrap_or_else(|| kind.default_patience()).max(1)
    }
}

/// Symmetric offsets `k·step` with `|k·step| <= span`, ascending.
///
/// A non-positive step or span degenerates to `[0.0]`.
pub(super) fn stencil_offsets(step: f64, span: f64) -> Vec<f64> {
    if !(step > 0.0 && span > 0.0) || !step.is_finite() || !span.is_finite() {
        return vec![0.0];
    }
    // Tolerance keeps `span` itself when it is an exact multiple of `step`.
    let n = (span / step + 1e-9).floor() as i64;
    (-n..=n).map(|k| k as f64 * step).collect()
}
