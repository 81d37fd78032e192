//! Session-scoped state and the types that flow across the controller's
//! public boundary. Everything here is plain data: no behavior, no
//! singletons. A host persists a [`SessionState`] however it likes (JSON
//! blob, database row, whatever) and hands it back on the next call.

use crate::bayes::{self, TraitPosterior};
use crate::config::EngineConfig;
use crate::item_bank::Trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle of a single trait's adaptive sub-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitPhase {
    Active,
    Completed,
}

/// Lifecycle of the whole session, across all six traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    InProgress,
    Done,
}

/// One administered item, in the order it was presented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdministrationRecord {
    pub item_id: u32,
    pub trait_: Trait,
    pub response: u8,
    /// Posterior mean for this trait immediately before this response was
    /// processed.
    pub theta_before: f64,
    /// Posterior mean for this trait immediately after.
    pub theta_after: f64,
    /// Posterior SD immediately before.
    pub se_before: f64,
    /// Posterior SD immediately after.
    pub se_after: f64,
    /// Fisher information this item carried at `theta_before` — the value
    /// the selector maximized over at pick time.
    pub fisher_information_at_selection: f64,
    /// Position of this record within the whole session (0-based), across
    /// all traits — the "global ordinal" of spec's administration record.
    pub global_ordinal: usize,
    /// Set when this update's normalizer was pathological and the trait's
    /// posterior was reset to the prior rather than genuinely updated.
    pub reset_to_prior: bool,
}

/// Full adaptive-test state for one respondent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub posteriors: HashMap<Trait, TraitPosterior>,
    pub phases: HashMap<Trait, TraitPhase>,
    pub history: Vec<AdministrationRecord>,
    pub phase: SessionPhase,
}

impl SessionState {
    /// A fresh session: every trait `Active` with the configured prior, no
    /// items administered.
    pub fn new(config: &EngineConfig) -> Self {
        let posteriors = Trait::ALL
            .iter()
            .map(|&t| (t, bayes::initial_posterior(config)))
            .collect();
        let phases = Trait::ALL.iter().map(|&t| (t, TraitPhase::Active)).collect();
        Self {
            posteriors,
            phases,
            history: Vec::new(),
            phase: SessionPhase::InProgress,
        }
    }

    pub fn total_items(&self) -> usize {
        self.history.len()
    }

    pub fn incomplete_traits(&self) -> Vec<Trait> {
        Trait::ALL
            .iter()
            .copied()
            .filter(|t| self.phases[t] == TraitPhase::Active)
            .collect()
    }

    pub fn items_administered_for(&self, trait_: Trait) -> Vec<u32> {
        self.posteriors[&trait_].items_used.to_vec()
    }
}

/// What the controller wants the host to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Present this item and collect a 1..=7 response.
    PresentItem { item_id: u32, trait_: Trait },
    /// Every trait has reached its stopping rule; `results` is the final
    /// payload, computed once as the session transitions to `Done`.
    Complete { results: Results },
}

/// Final per-trait summary, built once `SessionState::phase` is `Done`
/// (though callable earlier for mid-session progress reporting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitResult {
    pub trait_: Trait,
    pub theta_eap: f64,
    pub se: f64,
    pub likert_score: f64,
    pub items_administered: usize,
    /// Item ids administered for this trait, in presentation order.
    pub items_used: Vec<u32>,
    pub total_information: f64,
}

/// Whole-session final payload: one [`TraitResult`] per trait plus
/// session-level aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub per_trait: Vec<TraitResult>,
    pub total_items: usize,
    /// `1 - total_items / 24`, the fraction of the full 24-item survey the
    /// adaptive session avoided administering.
    pub item_reduction_rate: f64,
    /// Every administered item, across all traits, in presentation order.
    pub administration_history: Vec<AdministrationRecord>,
}

/// Full item bank size the reduction rate is measured against.
const FULL_SURVEY_LENGTH: usize = 24;

impl SessionState {
    /// One summary row per trait, in canonical order. Callable regardless
    /// of `phase` — useful for mid-session progress reporting, not just
    /// the terminal read.
    pub fn results(&self) -> Vec<TraitResult> {
        Trait::ALL
            .iter()
            .map(|&trait_| {
                let posterior = &self.posteriors[&trait_];
                TraitResult {
                    trait_,
                    theta_eap: posterior.theta_mean,
                    se: posterior.se,
                    likert_score: crate::mapping::theta_to_likert(posterior.theta_mean),
                    items_administered: posterior.items_used.len(),
                    items_used: posterior.items_used.to_vec(),
                    total_information: bayes::total_information(posterior),
                }
            })
            .collect()
    }

    /// The full session-level payload named in [`Action::Complete`].
    /// Meaningful once `phase` is `Done`; callable earlier too, in which
    /// case it reports a snapshot of the partial session.
    pub fn final_results(&self) -> Results {
        let total_items = self.total_items();
        Results {
            per_trait: self.results(),
            total_items,
            item_reduction_rate: 1.0 - total_items as f64 / FULL_SURVEY_LENGTH as f64,
            administration_history: self.history.clone(),
        }
    }
}
