//! Tuning parameters for the adaptive engine.
//!
//! Nothing here is a module-level singleton: an [`EngineConfig`] is
//! constructed once by the host and threaded explicitly through every
//! [`crate::controller`] and [`crate::bayes`] call. This replaces the
//! module-level `irt_engine` / `bayesian_updater` / `dose_algorithm`
//! instances of the reference implementation this crate generalizes.

use serde::{Deserialize, Serialize};

/// Evenly spaced quadrature grid over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaGrid {
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

impl ThetaGrid {
    pub fn step(&self) -> f64 {
        (self.max - self.min) / (self.points - 1) as f64
    }

    /// The grid points themselves, `theta_1 < ... < theta_points`.
    pub fn values(&self) -> Vec<f64> {
        let step = self.step();
        (0..self.points).map(|i| self.min + i as f64 * step).collect()
    }
}

impl Default for ThetaGrid {
    fn default() -> Self {
        Self {
            min: -4.0,
            max: 4.0,
            points: 161,
        }
    }
}

/// Discretized prior, `N(mean, sd)` by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    pub mean: f64,
    pub sd: f64,
}

impl Default for Prior {
    fn default() -> Self {
        Self { mean: 0.0, sd: 1.0 }
    }
}

impl Prior {
    pub fn density(&self, theta: f64) -> f64 {
        let z = (theta - self.mean) / self.sd;
        (-0.5 * z * z).exp() / (self.sd * (2.0 * std::f64::consts::PI).sqrt())
    }
}

/// Tuning parameters controlling stopping and quadrature precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A trait completes once its posterior SE drops below this.
    pub se_threshold: f64,
    /// Hard cap on items administered per trait (bank has exactly 4; values
    /// above 4 are meaningless since there is nothing left to administer).
    pub max_items_per_trait: usize,
    pub theta_grid: ThetaGrid,
    pub prior: Prior,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            se_threshold: 0.65,
            max_items_per_trait: 4,
            theta_grid: ThetaGrid::default(),
            prior: Prior::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_grid_step_matches_span() {
        let grid = ThetaGrid::default();
        let values = grid.values();
        assert_eq!(values.len(), grid.points);
        assert!((values[0] - grid.min).abs() < 1e-12);
        assert!((values[values.len() - 1] - grid.max).abs() < 1e-9);
    }

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.se_threshold, 0.65);
        assert_eq!(config.max_items_per_trait, 4);
        assert_eq!(config.theta_grid.min, -4.0);
        assert_eq!(config.theta_grid.max, 4.0);
    }

    #[test]
    fn prior_density_peaks_at_mean() {
        let prior = Prior::default();
        assert!(prior.density(0.0) > prior.density(1.0));
        assert!(prior.density(0.0) > prior.density(-1.0));
    }
}
