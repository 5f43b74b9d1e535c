//! Confidence combination (per ADR-002)
//!
//! When independent strategies agree on a concept, the combined score
//! should rise above any single strategy's score, and a single strategy's
//! score must remain a lower bound. The probabilistic-OR form
//! `1 - Π(1 - cᵢ)` has both properties.

/// Combine per-strategy confidences with probabilistic OR
///
/// `scores` holds each contributing strategy's best local confidence.
/// Inputs are clamped to [0, 1]; the empty slice combines to 0.0.
///
/// # Examples
///
/// ```
/// use linnaeus_domain::combine_confidences;
///
/// // Two agreeing strategies beat either alone
/// let combined = combine_confidences(&[0.8, 0.6]);
/// assert!((combined - 0.92).abs() < 1e-9);
///
/// // A single strategy passes through unchanged
/// assert!((combine_confidences(&[0.7]) - 0.7).abs() < 1e-9);
/// ```
pub fn combine_confidences(scores: &[f64]) -> f64 {
    let product: f64 = scores
        .iter()
        .map(|c| 1.0 - c.clamp(0.0, 1.0))
        .product();
    1.0 - product
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_combines_to_zero() {
        assert_eq!(combine_confidences(&[]), 0.0);
    }

    #[test]
    fn test_single_score_identity() {
        assert!((combine_confidences(&[0.5]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_agreement_increases_confidence() {
        // 1 - (1 - 0.8)(1 - 0.6) = 0.92
        let combined = combine_confidences(&[0.8, 0.6]);
        assert!((combined - 0.92).abs() < 1e-12);
    }

    #[test]
    fn test_three_strategies() {
        // 1 - 0.2 * 0.4 * 0.5 = 0.96
        let combined = combine_confidences(&[0.8, 0.6, 0.5]);
        assert!((combined - 0.96).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let combined = combine_confidences(&[1.5, -0.2]);
        assert!((combined - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_certain_strategy_dominates() {
        assert!((combine_confidences(&[1.0, 0.1]) - 1.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: combined confidence stays in [0, 1]
        #[test]
        fn test_combined_in_unit_interval(
            scores in proptest::collection::vec(0.0f64..=1.0, 0..6)
        ) {
            let combined = combine_confidences(&scores);
            prop_assert!((0.0..=1.0).contains(&combined));
        }

        /// Property: monotonic OR - the combined score is never lower
        /// than the best contributing score
        #[test]
        fn test_never_below_max_contributor(
            scores in proptest::collection::vec(0.0f64..=1.0, 1..6)
        ) {
            let combined = combine_confidences(&scores);
            let best = scores.iter().cloned().fold(0.0, f64::max);
            prop_assert!(combined >= best - 1e-12,
                "combined {} fell below best contributor {}", combined, best);
        }

        /// Property: adding a contributor never decreases the combination
        #[test]
        fn test_monotone_in_contributors(
            scores in proptest::collection::vec(0.0f64..=1.0, 1..5),
            extra in 0.0f64..=1.0
        ) {
            let base = combine_confidences(&scores);
            let mut extended = scores.clone();
            extended.push(extra);
            let grown = combine_confidences(&extended);
            prop_assert!(grown >= base - 1e-12);
        }
    }
}
