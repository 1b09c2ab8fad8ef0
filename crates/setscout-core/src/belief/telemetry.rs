use super::BeliefState;
use super::ranking::confidence_score;
use crate::model::AttributeKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeliefMetrics {
    pub species: String,
    pub observations: usize,
    pub confidence: f64,
    /// Shannon entropy (nats) per attribute, in [`AttributeKind::ALL`] order.
    pub entropy: [f64; 5],
    pub confirmed: usize,
    pub eliminated: usize,
}

impl BeliefMetrics {
    pub fn from_state(state: &BeliefState) -> Self {
        Self {
            species: state.species().to_string(),
            observations: state.history().len(),
            confidence: confidence_score(state),
            entropy: AttributeKind::ALL.map(|attribute| state.belief(attribute).entropy()),
            confirmed: state.confirmed().count(),
            eliminated: state.eliminated().count(),
        }
    }

    pub fn entropy_of(&self, attribute: AttributeKind) -> f64 {
        self.entropy[attribute.index()]
    }

    pub fn total_entropy(&self) -> f64 {
        self.entropy.iter().sum()
    }
}
