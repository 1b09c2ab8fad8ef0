//! Discrete probability mass over named candidates.

use crate::model::names::same_id;
use serde::Serialize;
use std::collections::BTreeMap;

/// Probability mass keyed by display name, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Distribution {
    entries: BTreeMap<String, f64>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a distribution from raw weights, keeping them as given.
    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: weights
                .into_iter()
                .map(|(value, weight)| (value.into(), weight))
                .collect(),
        }
    }

    /// Probability of `value`, matched by canonical id; 0 when unknown.
    pub fn get(&self, value: &str) -> f64 {
        match self.entries.get(value) {
            Some(prob) => *prob,
            None => self
                .find_key(value)
                .and_then(|key| self.entries.get(key))
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// The stored spelling of `value`, if present.
    pub fn find_key(&self, value: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.get_key_value(value) {
            return Some(key.as_str());
        }
        self.entries
            .keys()
            .find(|key| same_id(key, value))
            .map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.find_key(value).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(key, prob)| (key.as_str(), *prob))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nonzero_count(&self) -> usize {
        self.entries.values().filter(|prob| **prob > 0.0).count()
    }

    /// The only candidate with positive mass, if exactly one remains.
    pub fn sole_candidate(&self) -> Option<&str> {
        let mut nonzero = self.entries.iter().filter(|(_, prob)| **prob > 0.0);
        let (key, _) = nonzero.next()?;
        match nonzero.next() {
            Some(_) => None,
            None => Some(key.as_str()),
        }
    }

    /// Highest-probability candidate; ties resolve to the first name.
    pub fn argmax(&self) -> Option<(&str, f64)> {
        self.entries
            .iter()
            .filter(|(_, prob)| **prob > 0.0)
            .fold(None, |best: Option<(&str, f64)>, (key, prob)| match best {
                Some((_, best_prob)) if best_prob >= *prob => best,
                _ => Some((key.as_str(), *prob)),
            })
    }

    /// Shannon entropy (nats) over the positive entries.
    pub fn entropy(&self) -> f64 {
        self.entries
            .values()
            .filter(|prob| **prob > 0.0)
            .map(|prob| -prob * prob.ln())
            .sum()
    }

    pub(crate) fn set(&mut self, value: &str, prob: f64) {
        match self.entries.get_mut(value) {
            Some(slot) => *slot = prob,
            None => {
                self.entries.insert(value.to_string(), prob);
            }
        }
    }

    pub(crate) fn retain_positive(&mut self) {
        self.entries
            .retain(|_, prob| prob.is_finite() && *prob > 0.0);
    }

    /// Divides every entry by the total. Returns the pre-normalisation total.
    pub(crate) fn normalize(&mut self) -> f64 {
        let total = self.total();
        if total > 0.0 {
            for prob in self.entries.values_mut() {
                *prob /= total;
            }
        }
        total
    }

    /// Puts all mass on `value`, inserting it when absent.
    pub(crate) fn collapse_to(&mut self, value: &str) {
        for prob in self.entries.values_mut() {
            *prob = 0.0;
        }
        self.set(value, 1.0);
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut f64)> {
        self.entries
            .iter_mut()
            .map(|(key, prob)| (key.as_str(), prob))
    }
}
