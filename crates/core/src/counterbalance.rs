//! Counterbalancing helper for presenting the two measurement conditions
//! (the adaptive test and a comparison survey) in randomized order across
//! participants. Stateless: the caller owns the RNG and the resulting
//! order, this module only computes with them.

use rand::seq::SliceRandom;
use rand::Rng;

/// The two conditions being counterbalanced. Kept as a fixed pair rather
/// than a general permutation since the reference design only ever
/// compares these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Survey,
    AdaptiveTest,
}

pub const CONDITIONS: [Condition; 2] = [Condition::Survey, Condition::AdaptiveTest];

/// A randomized assignment of the two conditions to positions `0` and `1`.
pub fn assign_condition_order<R: Rng + ?Sized>(rng: &mut R) -> [Condition; 2] {
    let mut order = CONDITIONS;
    order.shuffle(rng);
    order
}

/// The first condition in `order` not yet in `completed`. Returns `None`
/// once every condition in `order` has been completed. Taking the whole
/// completed list (rather than just the last-run condition) is what lets
/// this same function answer "what's first" from an empty slice.
pub fn next_condition(order: &[Condition; 2], completed: &[Condition]) -> Option<Condition> {
    order.iter().copied().find(|c| !completed.contains(c))
}

/// 1-indexed position of `condition` within `order`.
pub fn sequence_number(order: &[Condition; 2], condition: Condition) -> Option<usize> {
    order.iter().position(|&c| c == condition).map(|idx| idx + 1)
}

/// Across many assigned orders, checks that both conditions appear first
/// roughly equally often — a sanity check for counterbalancing, not a
/// per-participant operation.
pub fn validate_order_balance(orders: &[[Condition; 2]]) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    let survey_first = orders.iter().filter(|o| o[0] == Condition::Survey).count();
    survey_first as f64 / orders.len() as f64
}
