//! Population usage statistics keyed by species.

use crate::model::AttributeKind;
use crate::model::names::same_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw usage weights for one species. Values are usage percentages; only
/// their ratios matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesUsage {
    #[serde(default)]
    pub abilities: BTreeMap<String, f64>,
    #[serde(default)]
    pub items: BTreeMap<String, f64>,
    #[serde(default)]
    pub moves: BTreeMap<String, f64>,
    #[serde(default)]
    pub spreads: BTreeMap<String, f64>,
    #[serde(default, alias = "tera")]
    pub tera_types: BTreeMap<String, f64>,
}

impl SpeciesUsage {
    pub fn attribute(&self, kind: AttributeKind) -> &BTreeMap<String, f64> {
        match kind {
            AttributeKind::Ability => &self.abilities,
            AttributeKind::Item => &self.items,
            AttributeKind::Moves => &self.moves,
            AttributeKind::Spread => &self.spreads,
            AttributeKind::Tera => &self.tera_types,
        }
    }

    fn attribute_mut(&mut self, kind: AttributeKind) -> &mut BTreeMap<String, f64> {
        match kind {
            AttributeKind::Ability => &mut self.abilities,
            AttributeKind::Item => &mut self.items,
            AttributeKind::Moves => &mut self.moves,
            AttributeKind::Spread => &mut self.spreads,
            AttributeKind::Tera => &mut self.tera_types,
        }
    }

    /// Replaces the weights recorded for `kind`.
    pub fn with(mut self, kind: AttributeKind, entries: &[(&str, f64)]) -> Self {
        let map = self.attribute_mut(kind);
        map.clear();
        for (value, weight) in entries {
            map.insert((*value).to_string(), *weight);
        }
        self
    }
}

/// Usage table for a whole format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageCorpus {
    species: BTreeMap<String, SpeciesUsage>,
}

impl UsageCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON corpus (`{"Species": {"abilities": {...}, ...}}`) from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CorpusError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CorpusError::Parse {
            source,
            path: path.to_path_buf(),
        })
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, CorpusError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn insert(&mut self, species: impl Into<String>, usage: SpeciesUsage) {
        self.species.insert(species.into(), usage);
    }

    /// Finds a species by exact name, falling back to its canonical id.
    pub fn lookup(&self, species: &str) -> Option<(&str, &SpeciesUsage)> {
        if let Some((name, usage)) = self.species.get_key_value(species) {
            return Some((name.as_str(), usage));
        }
        self.species
            .iter()
            .find(|(name, _)| same_id(name, species))
            .map(|(name, usage)| (name.as_str(), usage))
    }

    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Errors surfaced when loading a usage corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse corpus {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("failed to parse corpus JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "Kingambit": {
            "abilities": {"Supreme Overlord": 96.0, "Defiant": 4.0},
            "items": {"Leftovers": 50.0, "Black Glasses": 21.0},
            "moves": {"Sucker Punch": 98.0, "Swords Dance": 80.0},
            "usage": 31.2
        },
        "Great Tusk": {"tera": {"Ground": 40.0}}
    }"#;

    #[test]
    fn parses_and_ignores_unknown_fields() {
        let corpus = UsageCorpus::from_json_str(SAMPLE).expect("valid corpus");
        assert_eq!(corpus.len(), 2);
        let (_, usage) = corpus.lookup("Kingambit").expect("present");
        assert_eq!(usage.abilities.len(), 2);
        assert!(usage.spreads.is_empty());
    }

    #[test]
    fn lookup_falls_back_to_canonical_id() {
        let corpus = UsageCorpus::from_json_str(SAMPLE).expect("valid corpus");
        let (name, usage) = corpus.lookup("great-tusk").expect("id match");
        assert_eq!(name, "Great Tusk");
        assert_eq!(usage.tera_types.get("Ground"), Some(&40.0));
        assert!(corpus.lookup("Gholdengo").is_none());
    }

    #[test]
    fn from_path_reports_parse_location() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ not json").expect("write");
        let err = UsageCorpus::from_path(file.path()).expect_err("invalid json");
        assert!(matches!(err, CorpusError::Parse { .. }));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = UsageCorpus::from_path("/definitely/not/here.json").expect_err("missing");
        assert!(matches!(err, CorpusError::Read { .. }));
    }
}
