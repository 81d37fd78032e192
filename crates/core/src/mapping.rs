//! Theta-to-Likert score mapping and score comparison utilities.

use crate::item_bank::Trait;
use std::collections::HashMap;

/// Linear map from the theta scale to the 1..7 Likert scale used in the
/// reference interview materials: `likert = clip(4 + 0.75 * theta, 1, 7)`.
/// Equivalent in shape to the reference implementation's `[-3, 3] -> [1,
/// 7]` affine map but stated in the form the distilled spec fixes as
/// authoritative.
pub fn theta_to_likert(theta: f64) -> f64 {
    (4.0 + 0.75 * theta).clamp(1.0, 7.0)
}

/// Inverse of [`theta_to_likert`], for validating round trips and for
/// seeding simulations from a target Likert profile.
pub fn likert_to_theta(likert: f64) -> f64 {
    (likert - 4.0) / 0.75
}

/// Pearson correlation coefficient. Returns `0.0` rather than `NaN` when
/// either series has zero variance or the inputs are empty/mismatched.
pub fn pearson_r(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    let r = cov / denom;
    if r.is_finite() { r } else { 0.0 }
}

/// Mean absolute error between two equal-length series.
pub fn mean_absolute_error(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f64;
    a.iter().zip(b).map(|(&x, &y)| (x - y).abs()).sum::<f64>() / n
}

/// Root mean squared error between two equal-length series.
pub fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mse = a.iter().zip(b).map(|(&x, &y)| (x - y).powi(2)).sum::<f64>() / n;
    mse.sqrt()
}

/// Bundled comparison of two per-trait score sets (e.g. a participant's
/// adaptive results vs. their classical-baseline results), matching the
/// reference implementation's `compare_scores` output shape: aggregate
/// statistics over the traits both sets have in common, plus a per-trait
/// signed difference (`a - b`).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComparison {
    pub pearson_r: f64,
    pub mae: f64,
    pub rmse: f64,
    pub per_trait_diff: HashMap<Trait, f64>,
}

/// Compares two trait-keyed score maps. Only traits present in both `a` and
/// `b` contribute to the aggregate statistics and appear in
/// `per_trait_diff`; traits compared in [`Trait::ALL`] order for
/// determinism of the underlying Pearson/MAE/RMSE inputs.
pub fn compare_scores(a: &HashMap<Trait, f64>, b: &HashMap<Trait, f64>) -> ScoreComparison {
    let common: Vec<Trait> = Trait::ALL
        .iter()
        .copied()
        .filter(|t| a.contains_key(t) && b.contains_key(t))
        .collect();
    let xs: Vec<f64> = common.iter().map(|t| a[t]).collect();
    let ys: Vec<f64> = common.iter().map(|t| b[t]).collect();
    let per_trait_diff = common.iter().map(|&t| (t, a[&t] - b[&t])).collect();
    ScoreComparison {
        pearson_r: pearson_r(&xs, &ys),
        mae: mean_absolute_error(&xs, &ys),
        rmse: root_mean_squared_error(&xs, &ys),
        per_trait_diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_zero_maps_to_likert_four() {
        assert!((theta_to_likert(0.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn theta_to_likert_clamps_at_bounds() {
        assert_eq!(theta_to_likert(10.0), 7.0);
        assert_eq!(theta_to_likert(-10.0), 1.0);
    }

    #[test]
    fn likert_round_trips_within_range() {
        let theta = 1.25;
        let likert = theta_to_likert(theta);
        assert!((likert_to_theta(likert) - theta).abs() < 1e-9);
    }

    #[test]
    fn pearson_r_perfect_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson_r(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_r_zero_variance_returns_zero_not_nan() {
        let a = [1.0, 1.0, 1.0];
        let b = [2.0, 4.0, 6.0];
        assert_eq!(pearson_r(&a, &b), 0.0);
    }

    #[test]
    fn mae_and_rmse_zero_for_identical_series() {
        let a = [1.0, 2.0, 3.0];
        assert_eq!(mean_absolute_error(&a, &a), 0.0);
        assert_eq!(root_mean_squared_error(&a, &a), 0.0);
    }

    #[test]
    fn compare_scores_only_considers_traits_present_in_both_maps() {
        let a: HashMap<Trait, f64> = [(Trait::Extraversion, 5.0), (Trait::Openness, 3.0)].into();
        let b: HashMap<Trait, f64> = [(Trait::Extraversion, 4.0)].into();
        let cmp = compare_scores(&a, &b);
        assert_eq!(cmp.per_trait_diff.len(), 1);
        assert!((cmp.per_trait_diff[&Trait::Extraversion] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn compare_scores_with_no_common_traits_is_zeroed() {
        let a: HashMap<Trait, f64> = [(Trait::Extraversion, 5.0)].into();
        let b: HashMap<Trait, f64> = [(Trait::Openness, 3.0)].into();
        let cmp = compare_scores(&a, &b);
        assert_eq!(cmp.pearson_r, 0.0);
        assert_eq!(cmp.mae, 0.0);
        assert_eq!(cmp.rmse, 0.0);
        assert!(cmp.per_trait_diff.is_empty());
    }

    #[test]
    fn compare_scores_per_trait_diff_is_a_minus_b() {
        let a: HashMap<Trait, f64> = Trait::ALL.iter().map(|&t| (t, 5.0)).collect();
        let b: HashMap<Trait, f64> = Trait::ALL.iter().map(|&t| (t, 3.0)).collect();
        let cmp = compare_scores(&a, &b);
        for &t in &Trait::ALL {
            assert!((cmp.per_trait_diff[&t] - 2.0).abs() < 1e-12);
        }
    }
}
