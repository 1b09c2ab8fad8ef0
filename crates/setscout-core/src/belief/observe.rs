//! Observation processing: direct reveals, rule dispatch and auto-confirmation.

use super::hard::{BeliefContradictionError, BeliefState, ConfirmationSource, ContradictionKind};
use super::rules::{Effect, RuleBook, RuleContext, revealed_value};
use super::soft::SoftConfig;
use crate::correlation::CorrelationTable;
use crate::model::{AttributeKind, Observation};
use serde::Serialize;
use std::sync::Arc;
use tracing::{Level, event};

/// Whether an observation changed the belief state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    /// Nothing new was learned; the state and its history are untouched.
    Unchanged,
}

/// Applies observations to belief states.
///
/// Holds only read-only inputs, so one processor serves every entity in an
/// encounter.
#[derive(Debug, Clone)]
pub struct ObservationProcessor {
    rules: RuleBook,
    correlations: Arc<CorrelationTable>,
    soft: SoftConfig,
}

impl Default for ObservationProcessor {
    fn default() -> Self {
        Self::standard()
    }
}

impl ObservationProcessor {
    pub fn new(rules: RuleBook, correlations: Arc<CorrelationTable>, soft: SoftConfig) -> Self {
        Self {
            rules,
            correlations,
            soft,
        }
    }

    /// All rules, the built-in correlation table and environment-tuned boosts.
    pub fn standard() -> Self {
        Self::new(
            RuleBook::standard(),
            Arc::new(CorrelationTable::standard()),
            SoftConfig::from_env(),
        )
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn correlations(&self) -> &CorrelationTable {
        &self.correlations
    }

    pub fn soft(&self) -> &SoftConfig {
        &self.soft
    }

    /// Narrows `state` by one observation.
    ///
    /// On error `state` is left exactly as it was before the call.
    pub fn apply(
        &self,
        state: &mut BeliefState,
        observation: &Observation,
    ) -> Result<ApplyOutcome, BeliefContradictionError> {
        if let Observation::MoveRevealed { name } = observation {
            if state.has_observed_move(name) {
                return Ok(ApplyOutcome::Unchanged);
            }
        }

        let mut next = state.clone();
        if let Err((attribute, kind)) = self.update(&mut next, observation) {
            event!(
                target: "setscout_core::observe",
                Level::WARN,
                species = state.species(),
                attribute = %attribute,
                observation = %observation,
                kind = %kind,
                "belief contradiction"
            );
            return Err(BeliefContradictionError {
                attribute,
                observation: observation.clone(),
                kind,
            });
        }

        if next == *state {
            return Ok(ApplyOutcome::Unchanged);
        }
        next.record(observation.clone());
        *state = next;
        Ok(ApplyOutcome::Applied)
    }

    fn update(
        &self,
        state: &mut BeliefState,
        observation: &Observation,
    ) -> Result<(), (AttributeKind, ContradictionKind)> {
        self.reveal(state, observation)?;

        let ctx = RuleContext {
            correlations: &self.correlations,
            soft: &self.soft,
        };
        for rule in self.rules.rules_for(observation.kind()) {
            let effects = rule.evaluate(state, observation, &ctx);
            if effects.is_empty() {
                continue;
            }
            if tracing::enabled!(target: "setscout_core::observe", Level::DEBUG) {
                event!(
                    target: "setscout_core::observe",
                    Level::DEBUG,
                    species = state.species(),
                    rule = rule.name(),
                    effects = ?effects,
                    "rule fired"
                );
            }
            for effect in &effects {
                apply_effect(state, effect).map_err(|kind| (effect.attribute(), kind))?;
            }
        }

        for (attribute, value) in state.settle() {
            event!(
                target: "setscout_core::observe",
                Level::DEBUG,
                species = state.species(),
                attribute = %attribute,
                value = %value,
                "confirmed by elimination"
            );
        }
        Ok(())
    }

    fn reveal(
        &self,
        state: &mut BeliefState,
        observation: &Observation,
    ) -> Result<(), (AttributeKind, ContradictionKind)> {
        let Some((attribute, value)) = revealed_value(observation) else {
            return Ok(());
        };
        let result = match attribute {
            AttributeKind::Moves => state.observe_move(value),
            _ => state.confirm(attribute, value, ConfirmationSource::Revealed),
        };
        result.map(|_| ()).map_err(|kind| (attribute, kind))
    }
}

fn apply_effect(state: &mut BeliefState, effect: &Effect) -> Result<bool, ContradictionKind> {
    match effect {
        Effect::Eliminate { attribute, values } => state.eliminate(*attribute, values),
        Effect::Retain { attribute, values } => state.retain(*attribute, values),
        Effect::Scale {
            attribute,
            value,
            factor,
        } => Ok(state.scale(*attribute, value, *factor)),
        Effect::Confirm { attribute, value } => {
            state.confirm(*attribute, value, ConfirmationSource::Inferred)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{SpeciesUsage, UsageCorpus};
    use crate::model::{Effectiveness, HazardKind};
    use crate::space::ConfigurationSpace;

    fn processor() -> ObservationProcessor {
        ObservationProcessor::new(
            RuleBook::standard(),
            Arc::new(CorrelationTable::empty()),
            SoftConfig::default(),
        )
    }

    fn state(items: &[(&str, f64)]) -> BeliefState {
        let mut corpus = UsageCorpus::new();
        corpus.insert(
            "Testmon",
            SpeciesUsage::default()
                .with(AttributeKind::Ability, &[("Protosynthesis", 0.7), ("Intimidate", 0.3)])
                .with(AttributeKind::Item, items)
                .with(
                    AttributeKind::Moves,
                    &[("Close Combat", 0.4), ("Earthquake", 0.4), ("Protect", 0.2)],
                ),
        );
        let space = ConfigurationSpace::build("Testmon", &corpus).expect("known species");
        BeliefState::new(Arc::new(space))
    }

    #[test]
    fn applied_observations_are_recorded() {
        let mut state = state(&[("Leftovers", 0.5), ("Life Orb", 0.5)]);
        let outcome = processor()
            .apply(&mut state, &Observation::move_revealed("Protect"))
            .expect("consistent");
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(state.history(), &[Observation::move_revealed("Protect")]);
    }

    #[test]
    fn uninformative_observations_leave_history_alone() {
        let mut state = state(&[("Leftovers", 0.5), ("Life Orb", 0.5)]);
        let outcome = processor()
            .apply(&mut state, &Observation::SpeedAnomaly)
            .expect("consistent");
        assert_eq!(outcome, ApplyOutcome::Unchanged);
        assert!(state.history().is_empty());
    }

    #[test]
    fn contradiction_leaves_state_untouched() {
        let processor = processor();
        let mut state = state(&[("Heavy-Duty Boots", 1.0)]);
        let before = state.clone();
        let err = processor
            .apply(&mut state, &Observation::HazardDamageTaken)
            .expect_err("boots cannot take hazard damage");
        assert_eq!(err.attribute, AttributeKind::Item);
        assert_eq!(err.kind, ContradictionKind::ConfirmedValueEliminated);
        assert_eq!(state, before);
    }

    #[test]
    fn booster_activation_confirms_ability_and_item() {
        let mut state = state(&[("Booster Energy", 0.6), ("Leftovers", 0.4)]);
        processor()
            .apply(
                &mut state,
                &Observation::BoosterActivated {
                    ability: "Protosynthesis".to_string(),
                    field_condition: false,
                },
            )
            .expect("consistent");
        assert_eq!(state.confirmed_value(AttributeKind::Ability), Some("Protosynthesis"));
        assert_eq!(state.confirmed_value(AttributeKind::Item), Some("Booster Energy"));
        assert_eq!(
            state.confirmation(AttributeKind::Item, "Booster Energy"),
            Some(ConfirmationSource::Inferred)
        );
    }

    #[test]
    fn unannounced_hit_can_settle_the_item() {
        let mut state = state(&[("Air Balloon", 0.5), ("Leftovers", 0.5)]);
        processor()
            .apply(
                &mut state,
                &Observation::damage_taken(30.0, Effectiveness::Neutral),
            )
            .expect("consistent");
        assert_eq!(state.confirmed_value(AttributeKind::Item), Some("Leftovers"));
        assert_eq!(
            state.confirmation(AttributeKind::Item, "Leftovers"),
            Some(ConfirmationSource::Elimination)
        );
    }

    #[test]
    fn natural_immunity_teaches_nothing() {
        let mut state = state(&[("Heavy-Duty Boots", 0.3), ("Leftovers", 0.7)]);
        let outcome = processor()
            .apply(
                &mut state,
                &Observation::HazardAvoided {
                    hazard: HazardKind::StealthRock,
                    naturally_immune: true,
                },
            )
            .expect("consistent");
        assert_eq!(outcome, ApplyOutcome::Unchanged);
    }

    #[test]
    fn revealing_an_eliminated_item_conflicts() {
        let processor = processor();
        let mut state = state(&[("Choice Scarf", 0.5), ("Leftovers", 0.5)]);
        processor
            .apply(&mut state, &Observation::move_revealed("Close Combat"))
            .expect("first move");
        processor
            .apply(&mut state, &Observation::move_revealed("Earthquake"))
            .expect("second move");
        let err = processor
            .apply(&mut state, &Observation::item_revealed("Choice Scarf"))
            .expect_err("scarf was ruled out");
        assert_eq!(err.kind, ContradictionKind::ConflictingReveal);
    }
}
