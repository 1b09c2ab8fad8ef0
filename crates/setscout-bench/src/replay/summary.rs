use std::fs;
use std::path::Path;

use serde::Serialize;
use setscout_core::PredictedSet;

/// Per-scenario tallies collected while replaying.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub species: String,
    pub applied: usize,
    pub unchanged: usize,
    pub contradictions: usize,
    pub final_confidence: Option<f64>,
    pub predicted: Option<PredictedSet>,
    pub error: Option<String>,
}

impl ScenarioSummary {
    pub(super) fn new(name: &str, species: &str) -> Self {
        Self {
            name: name.to_string(),
            species: species.to_string(),
            applied: 0,
            unchanged: 0,
            contradictions: 0,
            final_confidence: None,
            predicted: None,
            error: None,
        }
    }
}

pub(super) fn write_markdown(
    path: &Path,
    run_id: &str,
    scenarios: &[ScenarioSummary],
) -> std::io::Result<()> {
    let mut rows = String::new();
    rows.push_str(&format!("# Replay Summary: {run_id}\n\n"));
    rows.push_str("| Scenario | Species | Applied | Unchanged | Contradictions | Confidence | Ability | Item | Moves | Spread | Tera |\n");
    rows.push_str("|----------|---------|---------|-----------|----------------|------------|---------|------|-------|--------|------|\n");

    for scenario in scenarios {
        let Some(predicted) = scenario.predicted.as_ref() else {
            rows.push_str(&format!(
                "| {name} | {species} | - | - | - | - | {error} | | | | |\n",
                name = scenario.name,
                species = scenario.species,
                error = scenario.error.as_deref().unwrap_or("not replayed"),
            ));
            continue;
        };

        rows.push_str(&format!(
            "| {name} | {species} | {applied} | {unchanged} | {contradictions} | {confidence:.3} | {ability} | {item} | {moves} | {spread} | {tera} |\n",
            name = scenario.name,
            species = predicted.species,
            applied = scenario.applied,
            unchanged = scenario.unchanged,
            contradictions = scenario.contradictions,
            confidence = scenario.final_confidence.unwrap_or(0.0),
            ability = cell(predicted.ability.as_deref()),
            item = cell(predicted.item.as_deref()),
            moves = predicted.moves.join(", "),
            spread = cell(predicted.spread.as_deref()),
            tera = cell(predicted.tera.as_deref()),
        ));
    }

    fs::write(path, rows)
}

fn cell(value: Option<&str>) -> &str {
    value.unwrap_or("?")
}
