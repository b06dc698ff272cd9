use crate::circle::CircleCandidate;
use crate::objective::ObjectiveKind;

/// Round to `decimals` places; non-finite values and values whose scaled
/// form overflows pass through unchanged.
pub(super) fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals.min(15) as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// Regression check: the refined objective must be strictly better than the
/// seed's after rounding both.
pub(super) fn improves_on_seed(
    kind: ObjectiveKind,
    objective_initial: f64,
    objective_final: f64,
    decimals: u32,
) -> bool {
    let initial = round_to(objective_initial, decimals);
    let refined = round_to(objective_final, decimals);
    refined.is_finite() && kind.better(refined, initial)
}

/// Axis-order heuristic: if `x > y` holds for the seed but not for the
/// refined candidate (or vice versa), return the refined candidate with `x`
/// and `y` exchanged.
pub(super) fn axis_order_corrected(
    seed: &CircleCandidate,
    refined: &CircleCandidate,
) -> Option<CircleCandidate> {
    if (seed.x > seed.y) == (refined.x > refined.y) {
        return None;
    }
    Some(refined.with_center(refined.y, refined.x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_hides_sub_threshold_gains() {
        assert!(!improves_on_seed(ObjectiveKind::Variance, 1.0, 1.0 - 1e-9, 6));
        assert!(improves_on_seed(ObjectiveKind::Variance, 1.0, 1.0 - 1e-3, 6));
        assert!(!improves_on_seed(ObjectiveKind::Sum, 5.0, 5.0 + 4e-7, 6));
        assert!(improves_on_seed(ObjectiveKind::Sum, 5.0, 5.1, 6));
    }

    #[test]
    fn equal_or_worse_is_rejected() {
        assert!(!improves_on_seed(ObjectiveKind::Variance, 0.0, 0.0, 6));
        assert!(!improves_on_seed(ObjectiveKind::Variance, 2.0, 3.0, 6));
        assert!(!improves_on_seed(ObjectiveKind::Sum, 3.0, 2.0, 6));
    }

    #[test]
    fn invalid_seed_is_beaten_by_any_valid_result() {
        assert!(improves_on_seed(ObjectiveKind::Variance, f64::INFINITY, 1e6, 6));
        assert!(improves_on_seed(ObjectiveKind::Sum, f64::NEG_INFINITY, 0.0, 6));
        assert!(!improves_on_seed(
            ObjectiveKind::Sum,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            6
        ));
    }

    #[test]
    fn round_to_passes_through_large_values() {
        assert_eq!(round_to(1e305, 6), 1e305);
        assert_eq!(round_to(1.23456789, 3), 1.235);
        assert!(round_to(f64::NAN, 3).is_nan());
    }

    #[test]
    fn axis_guard_swaps_only_on_flip() {
        let seed = CircleCandidate::new(30.0, 34.0, 18.0).unwrap();
        let same = CircleCandidate::new(31.0, 33.0, 19.0).unwrap();
        assert_eq!(axis_order_corrected(&seed, &same), None);

        let flipped = CircleCandidate::new(32.6, 32.4, 20.0).unwrap();
        let fixed = axis_order_corrected(&seed, &flipped).unwrap();
        assert_eq!(fixed.center(), [32.4, 32.6]);
        assert_eq!(fixed.r, 20.0);
    }
}
