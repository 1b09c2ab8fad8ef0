//! Facade bundling the corpus and the processor behind the caller-facing operations.

use crate::belief::{
    ApplyOutcome, BeliefContradictionError, BeliefState, Candidate, ObservationProcessor,
    PredictedSet, RuleBook, SoftConfig, confidence_score, most_likely, top_candidates,
};
use crate::correlation::CorrelationTable;
use crate::corpus::UsageCorpus;
use crate::model::{AttributeKind, Observation};
use crate::space::{ConfigurationSpace, SpaceBuilder, UnknownSpeciesError};
use std::sync::Arc;

/// Entry point for callers that track opponents across an encounter.
///
/// The engine owns only read-only inputs. Belief states are owned by the
/// caller, one per opponent entity, and passed into every call.
#[derive(Debug, Clone)]
pub struct Engine {
    corpus: Arc<UsageCorpus>,
    bans: Vec<(AttributeKind, String)>,
    rules: RuleBook,
    correlations: Arc<CorrelationTable>,
    soft: SoftConfig,
    processor: ObservationProcessor,
}

impl Engine {
    /// Standard rules, built-in correlations and environment-tuned boosts.
    pub fn new(corpus: impl Into<Arc<UsageCorpus>>) -> Self {
        let rules = RuleBook::standard();
        let correlations = Arc::new(CorrelationTable::standard());
        let soft = SoftConfig::from_env();
        Self {
            corpus: corpus.into(),
            bans: Vec::new(),
            processor: ObservationProcessor::new(rules.clone(), Arc::clone(&correlations), soft),
            rules,
            correlations,
            soft,
        }
    }

    pub fn with_correlations(mut self, correlations: impl Into<Arc<CorrelationTable>>) -> Self {
        self.correlations = correlations.into();
        self.rebuild_processor()
    }

    pub fn with_config(mut self, soft: SoftConfig) -> Self {
        self.soft = soft;
        self.rebuild_processor()
    }

    pub fn with_rules(mut self, rules: RuleBook) -> Self {
        self.rules = rules;
        self.rebuild_processor()
    }

    /// Values removed from every species' domain before normalisation.
    pub fn with_bans<I, S>(mut self, bans: I) -> Self
    where
        I: IntoIterator<Item = (AttributeKind, S)>,
        S: Into<String>,
    {
        self.bans
            .extend(bans.into_iter().map(|(attribute, value)| (attribute, value.into())));
        self
    }

    pub fn corpus(&self) -> &UsageCorpus {
        &self.corpus
    }

    pub fn processor(&self) -> &ObservationProcessor {
        &self.processor
    }

    pub fn build_configuration_space(
        &self,
        species: &str,
    ) -> Result<Arc<ConfigurationSpace>, UnknownSpeciesError> {
        SpaceBuilder::new(&self.corpus)
            .bans(self.bans.iter().map(|(attribute, value)| (*attribute, value.as_str())))
            .build(species)
            .map(Arc::new)
    }

    pub fn new_belief_state(&self, space: Arc<ConfigurationSpace>) -> BeliefState {
        BeliefState::new(space)
    }

    pub fn apply_observation(
        &self,
        state: &mut BeliefState,
        observation: &Observation,
    ) -> Result<ApplyOutcome, BeliefContradictionError> {
        self.processor.apply(state, observation)
    }

    pub fn top_candidates(
        &self,
        state: &BeliefState,
        attribute: AttributeKind,
        n: usize,
    ) -> Vec<Candidate> {
        top_candidates(state, attribute, n)
    }

    pub fn confidence_score(&self, state: &BeliefState) -> f64 {
        confidence_score(state)
    }

    pub fn most_likely(&self, state: &BeliefState) -> PredictedSet {
        most_likely(state)
    }

    fn rebuild_processor(mut self) -> Self {
        self.processor =
            ObservationProcessor::new(self.rules.clone(), Arc::clone(&self.correlations), self.soft);
        self
    }
}
