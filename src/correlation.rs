//! Bounded Pearson correlation between a factor series and a mood series
//!
//! The per-user samples here are tiny (a handful of entries), so the value is
//! an indicator of linear association, not a significance test.

use statrs::statistics::Statistics;

/// Pearson correlation coefficient of two paired series, clamped to [-1, 1].
///
/// Degenerate input never produces NaN or infinity. Mismatched lengths, empty
/// series and series with zero variance all yield exactly `0.0`.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return 0.0;
    }

    if is_constant(xs) || is_constant(ys) {
        return 0.0;
    }

    let mean_x = xs.iter().mean();
    let mean_y = ys.iter().mean();

    let (sum_xy, sum_xx, sum_yy) = xs.iter().zip(ys).fold(
        (0.0, 0.0, 0.0),
        |(sxy, sxx, syy), (x, y)| {
            let dx = x - mean_x;
            let dy = y - mean_y;
            (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
        },
    );

    let denominator = (sum_xx * sum_yy).sqrt();
    if !denominator.is_finite() || denominator <= 0.0 {
        return 0.0;
    }

    let r = sum_xy / denominator;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_perfect_positive_correlation() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]);
        assert!((r - 1.0).abs() < EPS);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let r = pearson(&[1.0, 2.0, 3.0], &[9.0, 6.0, 3.0]);
        assert!((r + 1.0).abs() < EPS);
    }

    #[test]
    fn test_unordered_colinear_series() {
        // sleep [4,2,3] against mood [8,4,6]
        let r = pearson(&[4.0, 2.0, 3.0], &[8.0, 4.0, 6.0]);
        assert!(r > 0.0);
        assert!((r - 1.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 5.0, 9.0]), 0.0);
        assert_eq!(pearson(&[1.0, 5.0, 9.0], &[0.1, 0.1, 0.1]), 0.0);
        assert_eq!(pearson(&[7.0], &[4.0]), 0.0);
    }

    #[test]
    fn test_uncorrelated_series() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, -1.0, -1.0, 1.0]);
        assert!(r.abs() < EPS);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_correlation_is_symmetric_and_bounded(
            pairs in prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 1..40)
        ) {
            let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

            let forward = pearson(&xs, &ys);
            let backward = pearson(&ys, &xs);

            prop_assert!(forward.is_finite());
            prop_assert!((-1.0..=1.0).contains(&forward));
            prop_assert!((forward - backward).abs() < 1e-12);
        }

        #[test]
        fn test_constant_series_yields_zero(
            constant in -100.0f64..100.0,
            ys in prop::collection::vec(-100.0f64..100.0, 1..30)
        ) {
            let xs = vec![constant; ys.len()];
            prop_assert_eq!(pearson(&xs, &ys), 0.0);
            prop_assert_eq!(pearson(&ys, &xs), 0.0);
        }

        #[test]
        fn test_positive_linear_maps_correlate_fully(
            ratings in prop::collection::vec(1u8..=5, 2..20),
            slope in 0.5f64..5.0,
            offset in -10.0f64..10.0
        ) {
            prop_assume!(ratings.windows(2).any(|w| w[0] != w[1]));
            let xs: Vec<f64> = ratings.iter().map(|&r| f64::from(r)).collect();
            let ys: Vec<f64> = xs.iter().map(|x| slope * x + offset).collect();

            prop_assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-6);
        }
    }
}
