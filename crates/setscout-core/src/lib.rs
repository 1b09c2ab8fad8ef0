pub mod belief;
pub mod corpus;
pub mod correlation;
pub mod engine;
pub mod model;
pub mod space;

pub use belief::{
    ApplyOutcome, BeliefContradictionError, BeliefState, Candidate, ContradictionKind,
    ObservationProcessor, PredictedSet, SoftConfig, SoftConfigError,
};
pub use corpus::{CorpusError, SpeciesUsage, UsageCorpus};
pub use correlation::{AttributeValue, CorrelationError, CorrelationTable};
pub use engine::Engine;
pub use model::{AttributeKind, Observation};
pub use space::{ConfigurationSpace, SpaceBuilder, UnknownSpeciesError};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "setscout"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "setscout");
        assert!(!AppInfo::version().is_empty());
    }
}
