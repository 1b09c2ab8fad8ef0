//! Belief state and the deterministic (hard) update primitives.

use super::Distribution;
use crate::model::names::same_id;
use crate::model::{AttributeKind, Observation};
use crate::space::ConfigurationSpace;
use core::fmt;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;

/// Number of move slots in a configuration.
pub const MOVE_SLOTS: usize = 4;

/// Why a value is known with certainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationSource {
    /// An observation named the value directly.
    Revealed,
    /// The domain held a single candidate from the start.
    SingletonDomain,
    /// Every competitor was eliminated.
    Elimination,
    /// An inference rule proved the value.
    Inferred,
}

/// Per-encounter probability mass over one opponent's hidden configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefState {
    space: Arc<ConfigurationSpace>,
    beliefs: [Distribution; 5],
    confirmed: BTreeMap<(AttributeKind, String), ConfirmationSource>,
    eliminated: BTreeSet<(AttributeKind, String)>,
    observed_moves: Vec<String>,
    history: Vec<Observation>,
}

impl BeliefState {
    /// Seeds every belief from its priors and confirms singleton domains.
    pub fn new(space: Arc<ConfigurationSpace>) -> Self {
        let beliefs = AttributeKind::ALL.map(|attribute| space.priors(attribute).clone());
        let mut state = Self {
            space,
            beliefs,
            confirmed: BTreeMap::new(),
            eliminated: BTreeSet::new(),
            observed_moves: Vec::new(),
            history: Vec::new(),
        };
        for attribute in AttributeKind::ALL {
            if !state.space.is_singleton(attribute) {
                continue;
            }
            if let Some(value) = state.beliefs[attribute.index()].sole_candidate() {
                let value = value.to_string();
                state.mark_confirmed(attribute, &value, ConfirmationSource::SingletonDomain);
            }
        }
        state
    }

    pub fn space(&self) -> &Arc<ConfigurationSpace> {
        &self.space
    }

    pub fn species(&self) -> &str {
        self.space.species()
    }

    pub fn belief(&self, attribute: AttributeKind) -> &Distribution {
        &self.beliefs[attribute.index()]
    }

    pub fn probability(&self, attribute: AttributeKind, value: &str) -> f64 {
        self.belief(attribute).get(value)
    }

    /// The confirmed value of a single-valued attribute.
    pub fn confirmed_value(&self, attribute: AttributeKind) -> Option<&str> {
        if !attribute.is_single_valued() {
            return None;
        }
        self.confirmed
            .keys()
            .find(|(kind, _)| *kind == attribute)
            .map(|(_, value)| value.as_str())
    }

    pub fn confirmation(&self, attribute: AttributeKind, value: &str) -> Option<ConfirmationSource> {
        self.confirmed
            .iter()
            .find(|((kind, known), _)| *kind == attribute && same_id(known, value))
            .map(|(_, source)| *source)
    }

    pub fn is_confirmed(&self, attribute: AttributeKind, value: &str) -> bool {
        self.confirmation(attribute, value).is_some()
    }

    pub fn is_attribute_confirmed(&self, attribute: AttributeKind) -> bool {
        if attribute.is_single_valued() {
            self.confirmed_value(attribute).is_some()
        } else {
            self.moveset_complete()
        }
    }

    pub fn confirmed_moves(&self) -> impl Iterator<Item = &str> {
        self.confirmed
            .keys()
            .filter(|(kind, _)| *kind == AttributeKind::Moves)
            .map(|(_, value)| value.as_str())
    }

    pub fn confirmed_move_count(&self) -> usize {
        self.confirmed_moves().count()
    }

    pub fn moveset_complete(&self) -> bool {
        self.confirmed_move_count() >= MOVE_SLOTS
    }

    /// Moves seen used, in reveal order.
    pub fn observed_moves(&self) -> &[String] {
        &self.observed_moves
    }

    pub fn has_observed_move(&self, name: &str) -> bool {
        self.observed_moves.iter().any(|seen| same_id(seen, name))
    }

    pub fn is_eliminated(&self, attribute: AttributeKind, value: &str) -> bool {
        self.eliminated
            .iter()
            .any(|(kind, gone)| *kind == attribute && same_id(gone, value))
    }

    pub fn eliminated(&self) -> impl Iterator<Item = (AttributeKind, &str)> {
        self.eliminated
            .iter()
            .map(|(kind, value)| (*kind, value.as_str()))
    }

    pub fn confirmed(&self) -> impl Iterator<Item = (AttributeKind, &str, ConfirmationSource)> {
        self.confirmed
            .iter()
            .map(|((kind, value), source)| (*kind, value.as_str(), *source))
    }

    /// Observations that changed this state, in application order.
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    /// Unconfirmed moves still carrying mass.
    pub fn open_moves(&self) -> impl Iterator<Item = (&str, f64)> {
        self.belief(AttributeKind::Moves)
            .iter()
            .filter(move |(name, prob)| *prob > 0.0 && !self.is_confirmed(AttributeKind::Moves, name))
    }

    /// Candidates of `attribute` that an update may still move.
    pub(crate) fn open_candidates(&self, attribute: AttributeKind) -> Vec<String> {
        if attribute.is_single_valued() {
            if self.confirmed_value(attribute).is_some() {
                return Vec::new();
            }
            return self
                .belief(attribute)
                .iter()
                .filter(|(_, prob)| *prob > 0.0)
                .map(|(value, _)| value.to_string())
                .collect();
        }
        self.open_moves().map(|(name, _)| name.to_string()).collect()
    }

    /// Appends a newly seen move and confirms it.
    pub(crate) fn observe_move(&mut self, name: &str) -> Result<bool, ContradictionKind> {
        if self.has_observed_move(name) {
            return Ok(false);
        }
        self.confirm(AttributeKind::Moves, name, ConfirmationSource::Revealed)?;
        let stored = self
            .belief(AttributeKind::Moves)
            .find_key(name)
            .unwrap_or(name)
            .to_string();
        self.observed_moves.push(stored);
        Ok(true)
    }

    /// Forces `value` to certainty. Returns whether anything changed.
    pub(crate) fn confirm(
        &mut self,
        attribute: AttributeKind,
        value: &str,
        source: ConfirmationSource,
    ) -> Result<bool, ContradictionKind> {
        if attribute.is_single_valued() {
            match self.confirmed_value(attribute) {
                Some(known) if same_id(known, value) => return Ok(false),
                Some(_) => return Err(ContradictionKind::ConflictingReveal),
                None => {}
            }
            if self.is_eliminated(attribute, value) {
                return Err(ContradictionKind::ConflictingReveal);
            }
            let key = self.stored_key(attribute, value);
            self.beliefs[attribute.index()].collapse_to(&key);
            self.mark_confirmed(attribute, &key, source);
            return Ok(true);
        }

        if self.is_confirmed(attribute, value) {
            return Ok(false);
        }
        if self.moveset_complete() {
            return Err(ContradictionKind::MovesetFull);
        }
        if self.is_eliminated(attribute, value) {
            return Err(ContradictionKind::ConflictingReveal);
        }
        let key = self.stored_key(attribute, value);
        self.beliefs[attribute.index()].set(&key, 1.0);
        self.mark_confirmed(attribute, &key, source);
        self.renormalize(attribute);
        self.close_moveset();
        Ok(true)
    }

    /// Forces every listed candidate to zero and renormalises the remainder.
    ///
    /// Attributes without corpus data are left alone; values already at zero
    /// are ignored.
    pub(crate) fn eliminate(
        &mut self,
        attribute: AttributeKind,
        values: &[String],
    ) -> Result<bool, ContradictionKind> {
        if self.belief(attribute).is_empty() {
            return Ok(false);
        }

        let before = self.belief(attribute).total();
        let mut changed = false;
        for value in values {
            let Some(key) = self.belief(attribute).find_key(value).map(str::to_string) else {
                continue;
            };
            if self.belief(attribute).get(&key) <= 0.0 {
                continue;
            }
            if self.is_confirmed(attribute, &key) {
                return Err(ContradictionKind::ConfirmedValueEliminated);
            }
            self.beliefs[attribute.index()].set(&key, 0.0);
            self.eliminated.insert((attribute, key));
            changed = true;
        }

        if !changed {
            return Ok(false);
        }
        if attribute.is_single_valued() && before > 0.0 && self.belief(attribute).total() <= 0.0 {
            return Err(ContradictionKind::AllCandidatesEliminated);
        }
        self.renormalize(attribute);
        Ok(true)
    }

    /// Eliminates every open candidate not listed in `keep`.
    pub(crate) fn retain(
        &mut self,
        attribute: AttributeKind,
        keep: &[String],
    ) -> Result<bool, ContradictionKind> {
        let doomed: Vec<String> = self
            .belief(attribute)
            .iter()
            .filter(|(value, prob)| *prob > 0.0 && !keep.iter().any(|kept| same_id(kept, value)))
            .map(|(value, _)| value.to_string())
            .collect();
        self.eliminate(attribute, &doomed)
    }

    /// Multiplies an open candidate by `factor` and renormalises.
    pub(crate) fn scale(&mut self, attribute: AttributeKind, value: &str, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 || factor == 1.0 {
            return false;
        }
        if attribute.is_single_valued() && self.confirmed_value(attribute).is_some() {
            return false;
        }
        if self.is_confirmed(attribute, value) {
            return false;
        }
        let Some(key) = self.belief(attribute).find_key(value).map(str::to_string) else {
            return false;
        };
        let prob = self.belief(attribute).get(&key);
        if prob <= 0.0 {
            return false;
        }
        self.beliefs[attribute.index()].set(&key, prob * factor);
        self.renormalize(attribute);
        true
    }

    /// Rescales the open mass of `attribute` to one.
    ///
    /// Confirmed moves keep probability one and sit outside the denominator.
    pub(crate) fn renormalize(&mut self, attribute: AttributeKind) {
        if attribute.is_single_valued() {
            self.beliefs[attribute.index()].normalize();
            return;
        }
        let confirmed: BTreeSet<String> = self.confirmed_moves().map(str::to_string).collect();
        let open_total: f64 = self
            .belief(attribute)
            .iter()
            .filter(|(name, _)| !confirmed.contains(*name))
            .map(|(_, prob)| prob)
            .sum();
        if open_total <= 0.0 {
            return;
        }
        for (name, prob) in self.beliefs[attribute.index()].iter_mut() {
            if !confirmed.contains(name) {
                *prob /= open_total;
            }
        }
    }

    /// Auto-confirms single-valued attributes narrowed to one candidate.
    pub(crate) fn settle(&mut self) -> Vec<(AttributeKind, String)> {
        let mut settled = Vec::new();
        for attribute in AttributeKind::ALL {
            if !attribute.is_single_valued() || self.confirmed_value(attribute).is_some() {
                continue;
            }
            let Some(value) = self.belief(attribute).sole_candidate().map(str::to_string) else {
                continue;
            };
            self.beliefs[attribute.index()].collapse_to(&value);
            self.mark_confirmed(attribute, &value, ConfirmationSource::Elimination);
            settled.push((attribute, value));
        }
        settled
    }

    pub(crate) fn record(&mut self, observation: Observation) {
        self.history.push(observation);
    }

    fn close_moveset(&mut self) {
        if !self.moveset_complete() {
            return;
        }
        let open: Vec<String> = self.open_moves().map(|(name, _)| name.to_string()).collect();
        for name in open {
            self.beliefs[AttributeKind::Moves.index()].set(&name, 0.0);
            self.eliminated.insert((AttributeKind::Moves, name));
        }
    }

    fn stored_key(&self, attribute: AttributeKind, value: &str) -> String {
        self.belief(attribute)
            .find_key(value)
            .unwrap_or(value)
            .to_string()
    }

    fn mark_confirmed(&mut self, attribute: AttributeKind, value: &str, source: ConfirmationSource) {
        self.confirmed.insert((attribute, value.to_string()), source);
    }
}

/// How a set of observations contradicted the priors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    /// Every remaining candidate was eliminated.
    AllCandidatesEliminated,
    /// A hard rule tried to eliminate a confirmed value.
    ConfirmedValueEliminated,
    /// A reveal disagrees with a confirmed or eliminated value.
    ConflictingReveal,
    /// A fifth distinct move was revealed.
    MovesetFull,
}

impl fmt::Display for ContradictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ContradictionKind::AllCandidatesEliminated => "every candidate was eliminated",
            ContradictionKind::ConfirmedValueEliminated => "the confirmed value was eliminated",
            ContradictionKind::ConflictingReveal => "the reveal conflicts with earlier evidence",
            ContradictionKind::MovesetFull => "more than four distinct moves were revealed",
        };
        f.write_str(message)
    }
}

/// Observations and priors are mutually inconsistent for one attribute.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("belief contradiction on {attribute} after '{observation}': {kind}")]
pub struct BeliefContradictionError {
    pub attribute: AttributeKind,
    pub observation: Observation,
    pub kind: ContradictionKind,
}
