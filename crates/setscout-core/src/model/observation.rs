use core::fmt;
use serde::{Deserialize, Serialize};

/// Non-volatile status conditions an entity can inflict on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StatusKind {
    Burn = 0,
    Poison = 1,
    Toxic = 2,
    Paralysis = 3,
    Sleep = 4,
    Freeze = 5,
}

impl StatusKind {
    pub const ALL: [StatusKind; 6] = [
        StatusKind::Burn,
        StatusKind::Poison,
        StatusKind::Toxic,
        StatusKind::Paralysis,
        StatusKind::Sleep,
        StatusKind::Freeze,
    ];
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusKind::Burn => "brn",
            StatusKind::Poison => "psn",
            StatusKind::Toxic => "tox",
            StatusKind::Paralysis => "par",
            StatusKind::Sleep => "slp",
            StatusKind::Freeze => "frz",
        };
        f.write_str(label)
    }
}

/// Type effectiveness of a hit as announced by the battle log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effectiveness {
    Resisted,
    Neutral,
    SuperEffective,
}

/// Entry hazards that can be set on a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    StealthRock,
    Spikes,
    ToxicSpikes,
    StickyWeb,
}

/// A single piece of information revealed about an opponent entity.
///
/// Produced by the log-decoding layer in the order events happened and
/// consumed by the observation processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Observation {
    MoveRevealed {
        #[serde(rename = "move")]
        name: String,
    },
    AbilityRevealed {
        ability: String,
    },
    ItemRevealed {
        item: String,
    },
    StatusSelfInflicted {
        status: StatusKind,
    },
    /// Took a hit with no item announcement.
    DamageTaken {
        percent_of_max: f64,
        effectiveness: Effectiveness,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        move_type: Option<String>,
    },
    PassiveHealObserved,
    HazardDamageTaken,
    TeraRevealed {
        tera_type: String,
    },
    /// Switched into a hazard and took no damage from it.
    HazardAvoided {
        hazard: HazardKind,
        /// Typing or another known source already explains the immunity.
        #[serde(default)]
        naturally_immune: bool,
    },
    /// Protosynthesis or Quark Drive activated.
    BoosterActivated {
        ability: String,
        /// Sun or Electric Terrain was active at the time.
        #[serde(default)]
        field_condition: bool,
    },
    MultiHit {
        hits: u8,
    },
    /// Moved before an opponent it should have been slower than.
    SpeedAnomaly,
}

impl Observation {
    pub fn move_revealed(name: impl Into<String>) -> Self {
        Observation::MoveRevealed { name: name.into() }
    }

    pub fn ability_revealed(ability: impl Into<String>) -> Self {
        Observation::AbilityRevealed {
            ability: ability.into(),
        }
    }

    pub fn item_revealed(item: impl Into<String>) -> Self {
        Observation::ItemRevealed { item: item.into() }
    }

    pub fn tera_revealed(tera_type: impl Into<String>) -> Self {
        Observation::TeraRevealed {
            tera_type: tera_type.into(),
        }
    }

    pub fn damage_taken(percent_of_max: f64, effectiveness: Effectiveness) -> Self {
        Observation::DamageTaken {
            percent_of_max,
            effectiveness,
            move_type: None,
        }
    }

    pub fn kind(&self) -> ObservationKind {
        match self {
            Observation::MoveRevealed { .. } => ObservationKind::MoveRevealed,
            Observation::AbilityRevealed { .. } => ObservationKind::AbilityRevealed,
            Observation::ItemRevealed { .. } => ObservationKind::ItemRevealed,
            Observation::StatusSelfInflicted { .. } => ObservationKind::StatusSelfInflicted,
            Observation::DamageTaken { .. } => ObservationKind::DamageTaken,
            Observation::PassiveHealObserved => ObservationKind::PassiveHealObserved,
            Observation::HazardDamageTaken => ObservationKind::HazardDamageTaken,
            Observation::TeraRevealed { .. } => ObservationKind::TeraRevealed,
            Observation::HazardAvoided { .. } => ObservationKind::HazardAvoided,
            Observation::BoosterActivated { .. } => ObservationKind::BoosterActivated,
            Observation::MultiHit { .. } => ObservationKind::MultiHit,
            Observation::SpeedAnomaly => ObservationKind::SpeedAnomaly,
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::MoveRevealed { name } => write!(f, "move revealed: {name}"),
            Observation::AbilityRevealed { ability } => write!(f, "ability revealed: {ability}"),
            Observation::ItemRevealed { item } => write!(f, "item revealed: {item}"),
            Observation::StatusSelfInflicted { status } => {
                write!(f, "self-inflicted status: {status}")
            }
            Observation::DamageTaken {
                percent_of_max,
                effectiveness,
                ..
            } => write!(f, "damage taken: {percent_of_max:.1}% ({effectiveness:?})"),
            Observation::PassiveHealObserved => f.write_str("passive heal"),
            Observation::HazardDamageTaken => f.write_str("hazard damage"),
            Observation::TeraRevealed { tera_type } => write!(f, "tera revealed: {tera_type}"),
            Observation::HazardAvoided { hazard, .. } => write!(f, "hazard avoided: {hazard:?}"),
            Observation::BoosterActivated {
                ability,
                field_condition,
            } => write!(f, "{ability} activated (field condition: {field_condition})"),
            Observation::MultiHit { hits } => write!(f, "multi-hit move landed {hits} hits"),
            Observation::SpeedAnomaly => f.write_str("unexpected speed"),
        }
    }
}

/// Discriminant of [`Observation`], used to route observations to rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationKind {
    MoveRevealed,
    AbilityRevealed,
    ItemRevealed,
    StatusSelfInflicted,
    DamageTaken,
    PassiveHealObserved,
    HazardDamageTaken,
    TeraRevealed,
    HazardAvoided,
    BoosterActivated,
    MultiHit,
    SpeedAnomaly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_move_reveal() {
        let obs: Observation =
            serde_json::from_str(r#"{"kind":"move_revealed","move":"Sucker Punch"}"#)
                .expect("valid observation");
        assert_eq!(obs, Observation::move_revealed("Sucker Punch"));
        assert_eq!(obs.kind(), ObservationKind::MoveRevealed);
    }

    #[test]
    fn deserializes_unit_and_defaulted_variants() {
        let heal: Observation =
            serde_json::from_str(r#"{"kind":"passive_heal_observed"}"#).expect("unit variant");
        assert_eq!(heal, Observation::PassiveHealObserved);

        let avoided: Observation =
            serde_json::from_str(r#"{"kind":"hazard_avoided","hazard":"stealth_rock"}"#)
                .expect("defaulted flag");
        assert_eq!(
            avoided,
            Observation::HazardAvoided {
                hazard: HazardKind::StealthRock,
                naturally_immune: false
            }
        );
    }

    #[test]
    fn damage_type_is_optional() {
        let hit: Observation = serde_json::from_str(
            r#"{"kind":"damage_taken","percent_of_max":42.0,"effectiveness":"super_effective"}"#,
        )
        .expect("untyped hit");
        assert_eq!(
            hit,
            Observation::damage_taken(42.0, Effectiveness::SuperEffective)
        );
    }

    #[test]
    fn display_names_the_revealed_value() {
        let obs = Observation::item_revealed("Leftovers");
        assert_eq!(obs.to_string(), "item revealed: Leftovers");
    }
}
