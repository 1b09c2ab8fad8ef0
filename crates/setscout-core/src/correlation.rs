//! Symmetric co-occurrence weights between attribute values.

use crate::model::AttributeKind;
use crate::model::names::to_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boost between moves that commonly share a moveset.
const MOVE_SYNERGY_WEIGHT: f64 = 1.5;
/// Boost between a move and the items it hints at.
const MOVE_ITEM_HINT_WEIGHT: f64 = 1.3;
/// Boost between an ability and the items built around it.
const ABILITY_ITEM_WEIGHT: f64 = 1.5;

const MOVE_SYNERGIES: &[(&str, &[&str])] = &[
    (
        "Swords Dance",
        &["Sucker Punch", "Close Combat", "Iron Head", "Earthquake"],
    ),
    (
        "Nasty Plot",
        &["Dark Pulse", "Sludge Bomb", "Flamethrower", "Focus Blast"],
    ),
    (
        "Dragon Dance",
        &["Outrage", "Earthquake", "Extreme Speed", "Fire Punch"],
    ),
    ("U-turn", &["Earthquake", "Close Combat", "Stone Edge"]),
    ("Volt Switch", &["Thunderbolt", "Focus Blast"]),
    ("Stealth Rock", &["Rapid Spin", "Earthquake", "Close Combat"]),
    ("Spikes", &["Rapid Spin", "Toxic", "Protect"]),
];

const MOVE_ITEM_HINTS: &[(&str, &[&str])] = &[
    ("Swords Dance", &["Leftovers", "Life Orb", "Lum Berry"]),
    ("Nasty Plot", &["Leftovers", "Life Orb", "Focus Sash"]),
    ("Dragon Dance", &["Leftovers", "Lum Berry", "Life Orb"]),
    ("U-turn", &["Choice Scarf", "Choice Band", "Heavy-Duty Boots"]),
    (
        "Volt Switch",
        &["Choice Specs", "Choice Scarf", "Heavy-Duty Boots"],
    ),
    (
        "Stealth Rock",
        &["Leftovers", "Rocky Helmet", "Heavy-Duty Boots"],
    ),
    ("Protect", &["Leftovers", "Black Sludge", "Sitrus Berry"]),
    ("Trick", &["Choice Scarf", "Choice Band", "Choice Specs"]),
    ("Switcheroo", &["Choice Scarf", "Choice Band", "Choice Specs"]),
];

const ABILITY_ITEM_SYNERGIES: &[(&str, &[&str])] = &[
    ("Magic Guard", &["Life Orb"]),
    ("Iron Barbs", &["Rocky Helmet"]),
    ("Rough Skin", &["Rocky Helmet"]),
    ("Weak Armor", &["Rocky Helmet"]),
    (
        "Unburden",
        &["Electric Seed", "Grassy Seed", "Misty Seed", "Psychic Seed"],
    ),
];

/// One side of a correlation pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeValue {
    pub attribute: AttributeKind,
    pub value: String,
}

impl AttributeValue {
    pub fn new(attribute: AttributeKind, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    pub fn ability(value: impl Into<String>) -> Self {
        Self::new(AttributeKind::Ability, value)
    }

    pub fn item(value: impl Into<String>) -> Self {
        Self::new(AttributeKind::Item, value)
    }

    pub fn move_name(value: impl Into<String>) -> Self {
        Self::new(AttributeKind::Moves, value)
    }
}

/// Serialised form of a table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub a: AttributeValue,
    pub b: AttributeValue,
    pub weight: f64,
}

type PairKey = ((AttributeKind, String), (AttributeKind, String));

/// Read-only lookup of pairwise weights. Absent pairs weigh 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationTable {
    weights: BTreeMap<PairKey, f64>,
}

impl CorrelationTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table of move synergies, move-to-item hints and ability-item pairings.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        let groups = [
            (
                MOVE_SYNERGIES,
                AttributeKind::Moves,
                AttributeKind::Moves,
                MOVE_SYNERGY_WEIGHT,
            ),
            (
                MOVE_ITEM_HINTS,
                AttributeKind::Moves,
                AttributeKind::Item,
                MOVE_ITEM_HINT_WEIGHT,
            ),
            (
                ABILITY_ITEM_SYNERGIES,
                AttributeKind::Ability,
                AttributeKind::Item,
                ABILITY_ITEM_WEIGHT,
            ),
        ];
        for (rows, left_kind, right_kind, weight) in groups {
            for &(left, partners) in rows {
                for &right in partners {
                    table.set((left_kind, left), (right_kind, right), weight);
                }
            }
        }
        table
    }

    /// Loads a JSON array of [`CorrelationEntry`] rows.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CorrelationError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CorrelationError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        let entries: Vec<CorrelationEntry> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| CorrelationError::Parse {
                source,
                path: path.to_path_buf(),
            })?;
        Self::from_entries(entries)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CorrelationError> {
        let entries: Vec<CorrelationEntry> = serde_json::from_str(raw)?;
        Self::from_entries(entries)
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = CorrelationEntry>,
    ) -> Result<Self, CorrelationError> {
        let mut table = Self::empty();
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }

    /// Adds or replaces a pair. Weights must be finite and positive.
    pub fn insert(&mut self, entry: CorrelationEntry) -> Result<(), CorrelationError> {
        if !entry.weight.is_finite() || entry.weight <= 0.0 {
            return Err(CorrelationError::InvalidWeight {
                a: entry.a.value,
                b: entry.b.value,
                weight: entry.weight,
            });
        }
        self.set(
            (entry.a.attribute, &entry.a.value),
            (entry.b.attribute, &entry.b.value),
            entry.weight,
        );
        Ok(())
    }

    pub fn with_pair(
        mut self,
        a: AttributeValue,
        b: AttributeValue,
        weight: f64,
    ) -> Result<Self, CorrelationError> {
        self.insert(CorrelationEntry { a, b, weight })?;
        Ok(self)
    }

    /// Weight of the pair, identical in both argument orders.
    pub fn weight(&self, a: (AttributeKind, &str), b: (AttributeKind, &str)) -> f64 {
        if self.weights.is_empty() {
            return 1.0;
        }
        self.weights.get(&pair_key(a, b)).copied().unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn set(&mut self, a: (AttributeKind, &str), b: (AttributeKind, &str), weight: f64) {
        self.weights.insert(pair_key(a, b), weight);
    }
}

fn pair_key(a: (AttributeKind, &str), b: (AttributeKind, &str)) -> PairKey {
    let left = (a.0, to_id(a.1));
    let right = (b.0, to_id(b.1));
    if left <= right {
        (left, right)
    } else {
        (right, left)
    }
}

/// Errors surfaced when loading a correlation table.
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("failed to read correlations {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse correlations {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("failed to parse correlation JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("correlation weight between '{a}' and '{b}' must be finite and positive, got {weight}")]
    InvalidWeight { a: String, b: String, weight: f64 },
}
