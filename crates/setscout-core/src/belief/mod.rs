//! Probabilistic belief tracking over an opponent's hidden configuration.
//!
//! This module is composed of:
//! - `distribution`: the probability-mass primitive shared by every attribute.
//! - `hard`: the belief state and its deterministic update primitives.
//! - `rules`: the closed registry of inference rules and their effects.
//! - `soft`: magnitudes of the soft reweighting rules.
//! - `observe`: the observation processor driving reveals and rules.
//! - `ranking`: read-only projections (top candidates, confidence, predicted set).
//! - `sampler`: configuration sampling for Monte Carlo consumers.

mod distribution;
mod hard;
mod observe;
pub mod ranking;
pub mod rules;
mod sampler;
pub mod soft;
pub mod telemetry;

pub use distribution::Distribution;
pub use hard::{
    BeliefContradictionError, BeliefState, ConfirmationSource, ContradictionKind, MOVE_SLOTS,
};
pub use observe::{ApplyOutcome, ObservationProcessor};
pub use ranking::{Candidate, PredictedSet, confidence_score, most_likely, top_candidates};
pub use rules::{Effect, Rule, RuleBook, RuleContext};
pub use sampler::{ConfigurationSampler, SampledConfiguration};
pub use soft::{SoftConfig, SoftConfigError};
