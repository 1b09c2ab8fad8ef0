//! Configuration sampling from a belief state.

use super::hard::{BeliefState, MOVE_SLOTS};
use crate::model::AttributeKind;
use rand::Rng;
use serde::Serialize;

/// One complete configuration drawn from a belief state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledConfiguration {
    pub ability: Option<String>,
    pub item: Option<String>,
    pub moves: Vec<String>,
    pub spread: Option<String>,
    pub tera: Option<String>,
    log_weight: f64,
}

impl SampledConfiguration {
    /// Log-probability of the random draws that produced this sample.
    pub fn log_weight(&self) -> f64 {
        self.log_weight
    }

    pub fn value(&self, attribute: AttributeKind) -> Option<&str> {
        match attribute {
            AttributeKind::Ability => self.ability.as_deref(),
            AttributeKind::Item => self.item.as_deref(),
            AttributeKind::Spread => self.spread.as_deref(),
            AttributeKind::Tera => self.tera.as_deref(),
            AttributeKind::Moves => None,
        }
    }
}

/// Draws weighted configurations for Monte Carlo consumers.
#[derive(Debug, Default)]
pub struct ConfigurationSampler;

impl ConfigurationSampler {
    /// Samples every attribute independently; moves are drawn without replacement.
    ///
    /// Confirmed values are always kept. Attributes with no data stay empty.
    pub fn sample<R: Rng + ?Sized>(state: &BeliefState, rng: &mut R) -> SampledConfiguration {
        let mut log_weight = 0.0;
        let mut single = |attribute: AttributeKind| -> Option<String> {
            if let Some(known) = state.confirmed_value(attribute) {
                return Some(known.to_string());
            }
            let pool: Vec<(String, f64)> = state
                .belief(attribute)
                .iter()
                .filter(|(_, prob)| *prob > 0.0)
                .map(|(value, prob)| (value.to_string(), prob))
                .collect();
            let (index, prob) = draw(&pool, rng)?;
            log_weight += prob.ln();
            Some(pool[index].0.clone())
        };

        let ability = single(AttributeKind::Ability);
        let item = single(AttributeKind::Item);
        let spread = single(AttributeKind::Spread);
        let tera = single(AttributeKind::Tera);

        let mut moves: Vec<String> = state.confirmed_moves().map(str::to_string).collect();
        let mut pool: Vec<(String, f64)> = state
            .open_moves()
            .map(|(name, prob)| (name.to_string(), prob))
            .collect();
        while moves.len() < MOVE_SLOTS {
            let Some((index, prob)) = draw(&pool, rng) else {
                break;
            };
            log_weight += prob.ln();
            moves.push(pool.swap_remove(index).0);
        }

        SampledConfiguration {
            ability,
            item,
            moves,
            spread,
            tera,
            log_weight,
        }
    }

    pub fn sample_many<R: Rng + ?Sized>(
        state: &BeliefState,
        count: usize,
        rng: &mut R,
    ) -> Vec<SampledConfiguration> {
        (0..count).map(|_| Self::sample(state, rng)).collect()
    }
}

/// Weighted draw; returns the index and its probability within the pool.
fn draw<R: Rng + ?Sized>(pool: &[(String, f64)], rng: &mut R) -> Option<(usize, f64)> {
    let total: f64 = pool.iter().map(|(_, weight)| weight).sum();
    if pool.is_empty() || !(total > 0.0) {
        return None;
    }
    let mut target = rng.gen_range(0.0..total);
    for (index, (_, weight)) in pool.iter().enumerate() {
        if target < *weight {
            return Some((index, weight / total));
        }
        target -= weight;
    }
    // Rounding can leave the target just past the last bucket.
    let last = pool.len() - 1;
    Some((last, pool[last].1 / total))
}
