//! Core adaptive measurement engine: Graded Response Model kernel, Bayesian
//! posterior updater, item-selection controller, classical scoring
//! baseline, and score mapping utilities.
//!
//! Nothing in this crate talks to the network, a filesystem, or a
//! database — it is a pure computation library. A host process owns
//! persistence, transport, and the item bank's lifecycle; see
//! [`config::EngineConfig`] for how the host supplies tuning parameters
//! instead of relying on module-level state.

pub mod bayes;
pub mod classical;
pub mod config;
pub mod controller;
pub mod counterbalance;
pub mod error;
pub mod irt;
pub mod item_bank;
pub mod mapping;
pub mod session;
