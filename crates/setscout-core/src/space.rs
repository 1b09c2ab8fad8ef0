//! Per-species prior distributions built from the usage corpus.

use crate::belief::Distribution;
use crate::corpus::{SpeciesUsage, UsageCorpus};
use crate::model::AttributeKind;
use crate::model::mechanics::forme_required_item;
use crate::model::names::same_id;
use thiserror::Error;
use tracing::{Level, event};

/// Immutable candidate values and priors for every attribute of one species.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationSpace {
    species: String,
    priors: [Distribution; 5],
}

impl ConfigurationSpace {
    /// Builds the space for `species` with no bans applied.
    pub fn build(species: &str, corpus: &UsageCorpus) -> Result<Self, UnknownSpeciesError> {
        SpaceBuilder::new(corpus).build(species)
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn priors(&self, attribute: AttributeKind) -> &Distribution {
        &self.priors[attribute.index()]
    }

    /// Prior of `value`, 0 for values outside the domain.
    pub fn prior(&self, attribute: AttributeKind, value: &str) -> f64 {
        self.priors(attribute).get(value)
    }

    /// Whether the domain of `attribute` holds exactly one candidate.
    pub fn is_singleton(&self, attribute: AttributeKind) -> bool {
        self.priors(attribute).len() == 1
    }
}

/// Builder applying format bans and forme rules on top of raw usage.
#[derive(Debug, Clone)]
pub struct SpaceBuilder<'a> {
    corpus: &'a UsageCorpus,
    bans: Vec<(AttributeKind, String)>,
}

impl<'a> SpaceBuilder<'a> {
    pub fn new(corpus: &'a UsageCorpus) -> Self {
        Self {
            corpus,
            bans: Vec::new(),
        }
    }

    /// Removes `value` from the `attribute` domain of every species.
    pub fn ban(mut self, attribute: AttributeKind, value: impl Into<String>) -> Self {
        self.bans.push((attribute, value.into()));
        self
    }

    pub fn bans<I, S>(mut self, bans: I) -> Self
    where
        I: IntoIterator<Item = (AttributeKind, S)>,
        S: Into<String>,
    {
        self.bans
            .extend(bans.into_iter().map(|(attribute, value)| (attribute, value.into())));
        self
    }

    pub fn build(&self, species: &str) -> Result<ConfigurationSpace, UnknownSpeciesError> {
        let (name, usage) = self
            .corpus
            .lookup(species)
            .ok_or_else(|| UnknownSpeciesError {
                species: species.to_string(),
            })?;
        Ok(self.build_from_usage(name, usage))
    }

    fn build_from_usage(&self, species: &str, usage: &SpeciesUsage) -> ConfigurationSpace {
        let mut priors = AttributeKind::ALL
            .map(|attribute| self.normalized_priors(species, attribute, usage));

        if let Some(required) = forme_required_item(species) {
            event!(
                target: "setscout_core::space",
                Level::DEBUG,
                species,
                item = required,
                "forme requires a single item"
            );
            priors[AttributeKind::Item.index()] = Distribution::from_weights([(required, 1.0)]);
        }

        ConfigurationSpace {
            species: species.to_string(),
            priors,
        }
    }

    fn normalized_priors(
        &self,
        species: &str,
        attribute: AttributeKind,
        usage: &SpeciesUsage,
    ) -> Distribution {
        let raw = usage.attribute(attribute);
        let mut dist = Distribution::from_weights(
            raw.iter()
                .filter(|(value, _)| !self.is_banned(attribute, value))
                .map(|(value, weight)| (value.clone(), *weight)),
        );

        let kept = dist.len();
        dist.retain_positive();
        let dropped = raw.len() - dist.len();
        if dropped > 0 && tracing::enabled!(Level::DEBUG) {
            event!(
                target: "setscout_core::space",
                Level::DEBUG,
                species,
                attribute = %attribute,
                banned = raw.len() - kept,
                unusable = kept - dist.len(),
                "dropped prior entries"
            );
        }

        dist.normalize();
        dist
    }

    fn is_banned(&self, attribute: AttributeKind, value: &str) -> bool {
        self.bans
            .iter()
            .any(|(kind, banned)| *kind == attribute && same_id(banned, value))
    }
}

/// The corpus has no entry for the requested species.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no usage data for species '{species}'")]
pub struct UnknownSpeciesError {
    pub species: String,
}
