pub mod attribute;
pub mod mechanics;
pub mod names;
pub mod observation;

pub use attribute::AttributeKind;
pub use observation::{Effectiveness, HazardKind, Observation, ObservationKind, StatusKind};
