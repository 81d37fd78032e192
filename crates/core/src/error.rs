use thiserror::Error;

/// Failure modes surfaced to the host service.
///
/// None of these are recovered inside the core: a pathological numeric
/// outcome (a non-positive normalizer, a non-finite posterior mean) is not
/// an error — it resets the affected trait's posterior to the prior and is
/// logged via `tracing::warn!`, see [`crate::bayes::update_with`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CatError {
    #[error("item {0} is not in the item bank")]
    UnknownItem(u32),

    #[error("response {0} is outside the valid 1..=7 range")]
    InvalidResponse(i64),

    #[error("response does not match the most recently presented item")]
    UnexpectedItem,

    #[error("session already reached Complete; no further responses accepted")]
    AlreadyCompleted,

    #[error("classical scoring requires all 24 items, got {0}")]
    IncompleteSurvey(usize),
}

pub type Result<T> = std::result::Result<T, CatError>;
