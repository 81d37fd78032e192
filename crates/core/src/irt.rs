//! Graded Response Model (Samejima, 1969) kernel.
//!
//! All operations here are pure functions of `(theta, item, response)` —
//! no session state, no mutation. Every probability computation clips and
//! renormalizes per the numeric-stability contract: exponents are clamped
//! to ±700 before `exp`, category masses are floored at `1e-10` and
//! renormalized to sum to one, and log-likelihoods are floored at `1e-300`
//! before taking `ln`.

use crate::item_bank::Item;

const EXPONENT_CLAMP: f64 = 700.0;
const CATEGORY_FLOOR: f64 = 1e-10;
const LIKELIHOOD_FLOOR: f64 = 1e-300;

/// The cumulative operating characteristic `P*(theta) = 1 / (1 +
/// exp(-alpha * (theta - beta)))`, clipped to avoid overflow in the
/// exponent.
pub fn cumulative_probability(theta: f64, alpha: f64, beta: f64) -> f64 {
    let exponent = (-alpha * (theta - beta)).clamp(-EXPONENT_CLAMP, EXPONENT_CLAMP);
    1.0 / (1.0 + exponent.exp())
}

/// Probability of each of the seven response categories at `theta`,
/// floored and renormalized to sum to exactly one.
pub fn category_probabilities(theta: f64, alpha: f64, beta: &[f64; 6]) -> [f64; 7] {
    let mut probs = [0.0; 7];

    probs[0] = 1.0 - cumulative_probability(theta, alpha, beta[0]);
    for k in 1..6 {
        probs[k] = cumulative_probability(theta, alpha, beta[k - 1])
            - cumulative_probability(theta, alpha, beta[k]);
    }
    probs[6] = cumulative_probability(theta, alpha, beta[5]);

    for p in probs.iter_mut() {
        *p = p.max(CATEGORY_FLOOR).min(1.0);
    }
    let sum: f64 = probs.iter().sum();
    for p in probs.iter_mut() {
        *p /= sum;
    }
    probs
}

/// Fisher information contributed by one item at `theta`:
/// `alpha^2 * sum_j P*(beta_j) * (1 - P*(beta_j))`.
pub fn fisher_information(theta: f64, alpha: f64, beta: &[f64; 6]) -> f64 {
    let info: f64 = beta
        .iter()
        .map(|&b| {
            let p = cumulative_probability(theta, alpha, b);
            p * (1.0 - p)
        })
        .sum();
    alpha * alpha * info
}

/// `P(X = response | theta)` for `response` in `1..=7`. Panics if `response`
/// is outside that range — callers validate against [`crate::error::CatError::InvalidResponse`]
/// before reaching here.
pub fn likelihood(response: u8, theta: f64, alpha: f64, beta: &[f64; 6]) -> f64 {
    assert!((1..=7).contains(&response), "response must be in 1..=7");
    category_probabilities(theta, alpha, beta)[(response - 1) as usize]
}

/// `log max(P(X=response|theta), 1e-300)`.
pub fn log_likelihood(response: u8, theta: f64, alpha: f64, beta: &[f64; 6]) -> f64 {
    likelihood(response, theta, alpha, beta).max(LIKELIHOOD_FLOOR).ln()
}

/// Expected response `E[X|theta] = sum_k k * P(X=k|theta)`, on the native
/// 1..7 scale. Not used by the production posterior update; it exists for
/// the Monte-Carlo simulator and for monotonicity sanity checks.
pub fn expected_score(theta: f64, alpha: f64, beta: &[f64; 6]) -> f64 {
    category_probabilities(theta, alpha, beta)
        .iter()
        .enumerate()
        .map(|(k, &p)| (k as f64 + 1.0) * p)
        .sum()
}

/// Applies the reverse-keying transformation exactly once. This is the
/// single point of truth for the rule in spec §4.1: raw item parameters are
/// always stored in item direction; likelihood and posterior operations use
/// `r' = 8 - r` for reverse-keyed items, and nowhere else in the crate is
/// this transform repeated.
pub fn effective_response(raw_response: u8, reverse_keyed: bool) -> u8 {
    if reverse_keyed {
        8 - raw_response
    } else {
        raw_response
    }
}

/// Log-likelihood of a raw response to a specific item, handling reverse
/// keying.
pub fn item_log_likelihood(item: &Item, raw_response: u8, theta: f64) -> f64 {
    let effective = effective_response(raw_response, item.reverse_keyed);
    log_likelihood(effective, theta, item.alpha, &item.beta)
}

/// Fisher information of a specific item at `theta`. Reverse keying does
/// not affect information (it is symmetric in the threshold structure), so
/// this ignores `item.reverse_keyed`.
pub fn item_fisher_information(item: &Item, theta: f64) -> f64 {
    fisher_information(theta, item.alpha, &item.beta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_bank::ITEM_BANK;

    #[test]
    fn category_probabilities_sum_to_one() {
        let item = &ITEM_BANK[0];
        for theta in [-4.0, -1.0, 0.0, 1.0, 4.0] {
            let probs = category_probabilities(theta, item.alpha, &item.beta);
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum={sum} at theta={theta}");
        }
    }

    #[test]
    fn category_probabilities_are_nonnegative() {
        let item = &ITEM_BANK[0];
        let probs = category_probabilities(-10.0, item.alpha, &item.beta);
        assert!(probs.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn cumulative_probability_saturates_without_overflow() {
        let p_hi = cumulative_probability(1e6, 1.0, 0.0);
        let p_lo = cumulative_probability(-1e6, 1.0, 0.0);
        assert!(p_hi.is_finite() && (p_hi - 1.0).abs() < 1e-9);
        assert!(p_lo.is_finite() && p_lo.abs() < 1e-9);
    }

    #[test]
    fn fisher_information_nonnegative() {
        let item = &ITEM_BANK[0];
        for theta in [-4.0, 0.0, 4.0] {
            assert!(fisher_information(theta, item.alpha, &item.beta) >= 0.0);
        }
    }

    #[test]
    fn fisher_information_at_zero_monotone_in_alpha() {
        // Two items with symmetric-ish thresholds around 0: higher alpha
        // should give higher information at theta=0 (spec §4.3 cold start).
        let beta = [-3.0, -2.0, -1.0, 1.0, 2.0, 3.0];
        let low = fisher_information(0.0, 0.5, &beta);
        let high = fisher_information(0.0, 1.5, &beta);
        assert!(high > low);
    }

    #[test]
    fn effective_response_applied_once() {
        assert_eq!(effective_response(6, true), 2);
        assert_eq!(effective_response(6, false), 6);
        assert_eq!(effective_response(1, true), 7);
    }

    #[test]
    fn expected_score_increases_with_theta_for_non_reversed_item() {
        let item = &ITEM_BANK[0]; // extraversion, non-reversed
        let low = expected_score(-3.0, item.alpha, &item.beta);
        let high = expected_score(3.0, item.alpha, &item.beta);
        assert!(high > low);
    }

    #[test]
    fn log_likelihood_matches_likelihood_ln() {
        let item = &ITEM_BANK[0];
        let theta = 0.3;
        let lik = likelihood(4, theta, item.alpha, &item.beta);
        let log_lik = log_likelihood(4, theta, item.alpha, &item.beta);
        assert!((log_lik - lik.ln()).abs() < 1e-12);
    }
}
