//! Bayesian posterior updater: per-trait grid-discretized posterior over
//! theta, updated multiplicatively on each response.

use crate::config::EngineConfig;
use crate::irt;
use crate::item_bank::{self, Item};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

const LOG_FLOOR: f64 = 1e-300;

/// Per-trait posterior state. `items_used` and `responses` are capped at
/// four elements in practice (one per trait's item bank), hence the
/// `SmallVec` inline capacity — no heap allocation on the common path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitPosterior {
    /// Density at each point of the host's `ThetaGrid`, same length and
    /// ordering as `ThetaGrid::values()`.
    pub density: Vec<f64>,
    pub theta_mean: f64,
    pub se: f64,
    pub items_used: SmallVec<[u32; 4]>,
    pub responses: SmallVec<[(u32, u8); 4]>,
}

fn trapezoidal_integral(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum()
}

fn eap_mean(grid: &[f64], density: &[f64]) -> f64 {
    let weighted: Vec<f64> = grid.iter().zip(density).map(|(&t, &d)| t * d).collect();
    trapezoidal_integral(grid, &weighted)
}

fn posterior_sd(grid: &[f64], density: &[f64], mean: f64) -> f64 {
    let squared: Vec<f64> = grid
        .iter()
        .zip(density)
        .map(|(&t, &d)| (t - mean).powi(2) * d)
        .collect();
    trapezoidal_integral(grid, &squared).max(0.0).sqrt()
}

fn prior_density_row(config: &EngineConfig) -> Vec<f64> {
    let grid = config.theta_grid.values();
    let mut density: Vec<f64> = grid.iter().map(|&t| config.prior.density(t)).collect();
    let norm = trapezoidal_integral(&grid, &density);
    for d in density.iter_mut() {
        *d /= norm;
    }
    density
}

/// A fresh posterior with the configured `N(mean, sd)` prior and no
/// administered items.
pub fn initial_posterior(config: &EngineConfig) -> TraitPosterior {
    let grid = config.theta_grid.values();
    let density = prior_density_row(config);
    let mean = eap_mean(&grid, &density);
    let se = posterior_sd(&grid, &density, mean);
    TraitPosterior {
        density,
        theta_mean: mean,
        se,
        items_used: SmallVec::new(),
        responses: SmallVec::new(),
    }
}

/// Result of [`update_with`]: the new posterior, plus whether the update
/// hit a pathological numeric outcome and fell back to resetting at the
/// prior (spec §7 — not an error, a logged diagnostic).
pub struct UpdateOutcome {
    pub posterior: TraitPosterior,
    pub reset_to_prior: bool,
}

/// Multiply `posterior` by the likelihood of `response` to `item` and
/// renormalize. Pure and deterministic: given the same inputs it always
/// returns the same output. Applying the same `(item, response)` pair twice
/// is not forbidden here — the controller is responsible for only ever
/// doing it once via `items_used`.
pub fn update_with(
    posterior: &TraitPosterior,
    item: &Item,
    response: u8,
    config: &EngineConfig,
) -> UpdateOutcome {
    let grid = config.theta_grid.values();

    let log_q: Vec<f64> = grid
        .iter()
        .zip(&posterior.density)
        .map(|(&theta, &pi)| {
            let log_pi = pi.max(LOG_FLOOR).ln();
            let log_lik = irt::item_log_likelihood(item, response, theta);
            log_pi + log_lik
        })
        .collect();

    let max_log = log_q.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let q: Vec<f64> = log_q.iter().map(|&v| (v - max_log).exp()).collect();
    let normalizer = trapezoidal_integral(&grid, &q);

    let (density, reset_to_prior) = if normalizer > 0.0 && normalizer.is_finite() {
        (q.into_iter().map(|v| v / normalizer).collect(), false)
    } else {
        tracing::warn!(
            item_id = item.id,
            "posterior normalizer non-positive, resetting trait to prior"
        );
        (prior_density_row(config), true)
    };

    let mean = eap_mean(&grid, &density);
    let (density, mean, reset_to_prior) = if mean.is_finite() {
        (density, mean, reset_to_prior)
    } else {
        tracing::warn!(item_id = item.id, "posterior mean non-finite, resetting trait to prior");
        let density = prior_density_row(config);
        let mean = eap_mean(&grid, &density);
        (density, mean, true)
    };
    let se = posterior_sd(&grid, &density, mean);

    let mut items_used = posterior.items_used.clone();
    items_used.push(item.id);
    let mut responses = posterior.responses.clone();
    responses.push((item.id, response));

    UpdateOutcome {
        posterior: TraitPosterior {
            density,
            theta_mean: mean,
            se,
            items_used,
            responses,
        },
        reset_to_prior,
    }
}

/// Total Fisher information accumulated by a trait's administered items,
/// evaluated at the trait's current posterior mean.
pub fn total_information(posterior: &TraitPosterior) -> f64 {
    posterior
        .items_used
        .iter()
        .filter_map(|&id| item_bank::get(id).ok())
        .map(|item| irt::item_fisher_information(item, posterior.theta_mean))
        .sum()
}

/// Expected posterior variance (EPV) of administering `candidate` next,
/// given the current posterior: `sum_r P(r|theta_hat) * Var(posterior |
/// hypothetical response r)`. An alternative to Fisher-information
/// maximization; not used by the default selector (see
/// [`crate::controller::ItemSelector`]).
pub fn expected_posterior_variance(
    posterior: &TraitPosterior,
    candidate: &Item,
    config: &EngineConfig,
) -> f64 {
    (1u8..=7)
        .map(|response| {
            let p_response = irt::likelihood(
                irt::effective_response(response, candidate.reverse_keyed),
                posterior.theta_mean,
                candidate.alpha,
                &candidate.beta,
            );
            let hypothetical = update_with(posterior, candidate, response, config);
            p_response * hypothetical.posterior.se.powi(2)
        })
        .sum()
}
