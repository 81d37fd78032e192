//! Classical test theory scoring: a non-adaptive baseline against which the
//! IRT/Bayesian pipeline's scores can be validated. Requires a response to
//! every one of the 24 bank items, unlike the adaptive path which typically
//! stops well short of that.

use crate::error::{CatError, Result};
use crate::irt::effective_response;
use crate::item_bank::{self, Trait, ITEM_BANK};
use std::collections::HashMap;

/// A full 24-item response set, keyed by item id.
pub type FullResponseSet = HashMap<u32, u8>;

/// Mean reverse-corrected response for one trait, on the native 1..7 scale.
pub fn trait_score(responses: &FullResponseSet, trait_: Trait) -> Result<f64> {
    let mut total = 0u32;
    let mut count = 0u32;
    for item in item_bank::items_for_trait(trait_) {
        let raw = *responses
            .get(&item.id)
            .ok_or(CatError::IncompleteSurvey(responses.len()))?;
        if !(1..=7).contains(&raw) {
            return Err(CatError::InvalidResponse(raw as i64));
        }
        total += effective_response(raw, item.reverse_keyed) as u32;
        count += 1;
    }
    Ok(total as f64 / count as f64)
}

/// Scores computed independently are never NaN by construction, so these
/// are returned directly rather than wrapped further — the only error path
/// is a short `responses` map.
pub fn all_trait_scores(responses: &FullResponseSet) -> Result<HashMap<Trait, f64>> {
    if responses.len() < ITEM_BANK.len() {
        return Err(CatError::IncompleteSurvey(responses.len()));
    }
    Trait::ALL
        .iter()
        .map(|&trait_| trait_score(responses, trait_).map(|score| (trait_, score)))
        .collect()
}
