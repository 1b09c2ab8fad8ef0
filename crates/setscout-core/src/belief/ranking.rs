//! Read-only projections of a belief state.

use super::hard::{BeliefState, MOVE_SLOTS};
use crate::model::AttributeKind;
use serde::Serialize;
use std::cmp::Ordering;

/// One ranked candidate value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub value: String,
    pub probability: f64,
    pub prior: f64,
    pub confirmed: bool,
}

/// The `n` most probable values of `attribute` with positive mass.
///
/// Ordered by probability, then prior, both descending, then by name.
pub fn top_candidates(state: &BeliefState, attribute: AttributeKind, n: usize) -> Vec<Candidate> {
    let space = state.space();
    let mut candidates: Vec<Candidate> = state
        .belief(attribute)
        .iter()
        .filter(|(_, prob)| *prob > 0.0)
        .map(|(value, probability)| Candidate {
            value: value.to_string(),
            probability,
            prior: space.prior(attribute, value),
            confirmed: state.is_confirmed(attribute, value),
        })
        .collect();
    candidates.sort_by(compare_candidates);
    candidates.truncate(n);
    candidates
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| b.prior.total_cmp(&a.prior))
        .then_with(|| a.value.cmp(&b.value))
}

/// Certainty of one attribute in `[0, 1]`.
///
/// Single-valued attributes score their top probability. The move attribute
/// scores the confirmed slots plus the open slots weighted by the mass of the
/// best open candidates.
pub fn attribute_confidence(state: &BeliefState, attribute: AttributeKind) -> f64 {
    if attribute.is_single_valued() {
        return state
            .belief(attribute)
            .argmax()
            .map(|(_, prob)| prob)
            .unwrap_or(0.0);
    }

    let confirmed = state.confirmed_move_count().min(MOVE_SLOTS);
    let open_slots = MOVE_SLOTS - confirmed;
    let mut open: Vec<f64> = state.open_moves().map(|(_, prob)| prob).collect();
    open.sort_by(|a, b| b.total_cmp(a));
    let open_mass: f64 = open.iter().take(open_slots).sum::<f64>().min(1.0);
    (confirmed as f64 + open_slots as f64 * open_mass) / MOVE_SLOTS as f64
}

/// Unweighted mean of the five attribute confidences.
pub fn confidence_score(state: &BeliefState) -> f64 {
    let total: f64 = AttributeKind::ALL
        .iter()
        .map(|attribute| attribute_confidence(state, *attribute))
        .sum();
    (total / AttributeKind::ALL.len() as f64).clamp(0.0, 1.0)
}

/// The single most plausible configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictedSet {
    pub species: String,
    pub ability: Option<String>,
    pub item: Option<String>,
    pub moves: Vec<String>,
    pub spread: Option<String>,
    pub tera: Option<String>,
}

/// Best value per attribute; confirmed moves first, topped up to four with
/// the best open moves.
pub fn most_likely(state: &BeliefState) -> PredictedSet {
    let best = |attribute: AttributeKind| {
        top_candidates(state, attribute, 1)
            .into_iter()
            .next()
            .map(|candidate| candidate.value)
    };

    let mut moves: Vec<String> = state.confirmed_moves().map(str::to_string).collect();
    if moves.len() < MOVE_SLOTS {
        let open = top_candidates(state, AttributeKind::Moves, usize::MAX);
        moves.extend(
            open.into_iter()
                .filter(|candidate| !candidate.confirmed)
                .take(MOVE_SLOTS - moves.len())
                .map(|candidate| candidate.value),
        );
    }

    PredictedSet {
        species: state.species().to_string(),
        ability: best(AttributeKind::Ability),
        item: best(AttributeKind::Item),
        moves,
        spread: best(AttributeKind::Spread),
        tera: best(AttributeKind::Tera),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{SpeciesUsage, UsageCorpus};
    use crate::space::ConfigurationSpace;
    use std::sync::Arc;

    fn state() -> BeliefState {
        let mut corpus = UsageCorpus::new();
        corpus.insert(
            "Testmon",
            SpeciesUsage::default()
                .with(AttributeKind::Ability, &[("Pressure", 1.0)])
                .with(
                    AttributeKind::Item,
                    &[("Leftovers", 0.4), ("Life Orb", 0.4), ("Choice Band", 0.2)],
                )
                .with(
                    AttributeKind::Moves,
                    &[
                        ("A", 0.25),
                        ("B", 0.25),
                        ("C", 0.2),
                        ("D", 0.2),
                        ("E", 0.1),
                    ],
                )
                .with(AttributeKind::Spread, &[("Jolly", 0.5), ("Adamant", 0.5)]),
        );
        let space = ConfigurationSpace::build("Testmon", &corpus).expect("known species");
        BeliefState::new(Arc::new(space))
    }

    #[test]
    fn ties_break_by_name() {
        let top = top_candidates(&state(), AttributeKind::Item, 2);
        let names: Vec<_> = top.iter().map(|candidate| candidate.value.as_str()).collect();
        assert_eq!(names, vec!["Leftovers", "Life Orb"]);
    }

    #[test]
    fn empty_attribute_has_no_candidates_and_no_confidence() {
        let state = state();
        assert!(top_candidates(&state, AttributeKind::Tera, 3).is_empty());
        assert_eq!(attribute_confidence(&state, AttributeKind::Tera), 0.0);
    }

    #[test]
    fn move_confidence_counts_top_four_mass() {
        let state = state();
        let expected = (4.0 * 0.9) / 4.0;
        assert!((attribute_confidence(&state, AttributeKind::Moves) - expected).abs() < 1e-12);
    }

    #[test]
    fn confidence_is_the_mean_over_attributes() {
        let state = state();
        let expected = (1.0 + 0.4 + 0.9 + 0.5 + 0.0) / 5.0;
        assert!((confidence_score(&state) - expected).abs() < 1e-12);
    }

    #[test]
    fn most_likely_tops_up_moves() {
        let predicted = most_likely(&state());
        assert_eq!(predicted.ability.as_deref(), Some("Pressure"));
        assert_eq!(predicted.moves, vec!["A", "B", "C", "D"]);
        assert_eq!(predicted.tera, None);
    }
}
