use std::fs;
use std::path::Path;

use setscout_bench::config::ReplayConfig;
use setscout_bench::replay::{ReplayError, ReplayRunner};
use tempfile::tempdir;

const CORPUS: &str = r#"{
    "Kingambit": {
        "abilities": {"Supreme Overlord": 96.0, "Defiant": 4.0},
        "items": {"Leftovers": 50.0, "Black Glasses": 21.0, "Air Balloon": 29.0},
        "moves": {
            "Sucker Punch": 98.0,
            "Swords Dance": 80.0,
            "Kowtow Cleave": 90.0,
            "Iron Head": 70.0,
            "Low Kick": 30.0
        },
        "spreads": {"Adamant:252/252/0/0/4/0": 60.0, "Careful:252/0/0/0/252/4": 40.0},
        "tera_types": {"Dark": 45.0, "Flying": 30.0, "Fairy": 25.0}
    }
}"#;

fn load_config(output_dir: &Path, corpus: &Path) -> ReplayConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
corpus: "{corpus}"
top_n: 2
scenarios:
  - name: "kingambit_lead"
    species: "Kingambit"
    observations:
      - kind: move_revealed
        move: "Sucker Punch"
      - kind: move_revealed
        move: "Swords Dance"
      - kind: move_revealed
        move: "Sucker Punch"
      - kind: item_revealed
        item: "Leftovers"
      - kind: item_revealed
        item: "Black Glasses"
  - name: "ghost"
    species: "Missingno"
    observations:
      - kind: speed_anomaly
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
engine:
  hazard_avoidance_boost: 3.0
logging:
  enable_structured: false
"#,
        corpus = corpus.display(),
        jsonl = output_dir.join("steps.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: ReplayConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

#[test]
fn replay_smoke_test_logs_every_step() {
    let dir = tempdir().expect("temp dir");
    let corpus = dir.path().join("corpus.json");
    fs::write(&corpus, CORPUS).expect("write corpus");
    let config = load_config(&dir.path().join("out"), &corpus);
    let outputs = config.resolved_outputs();

    let runner = ReplayRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("replay completes");

    // Initial row plus one per observation; the unknown species gets one row.
    assert_eq!(summary.rows_written, 7);
    assert_eq!(summary.contradictions, 1);
    assert_eq!(summary.scenarios.len(), 2);

    let kingambit = &summary.scenarios[0];
    assert_eq!(kingambit.applied, 3);
    assert_eq!(kingambit.unchanged, 1);
    assert_eq!(kingambit.contradictions, 1);
    let predicted = kingambit.predicted.as_ref().expect("prediction");
    assert_eq!(predicted.item.as_deref(), Some("Leftovers"));
    assert_eq!(predicted.moves.len(), 4);
    assert!(predicted.moves.iter().any(|name| name == "Sucker Punch"));
    assert!(predicted.moves.iter().any(|name| name == "Swords Dance"));
    assert!(summary.scenarios[1].error.is_some());
    assert_eq!(summary.predictions().count(), 1);

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    let rows: Vec<serde_json::Value> = jsonl
        .lines()
        .map(|line| serde_json::from_str(line).expect("row decodes to JSON"))
        .collect();
    assert_eq!(rows.len(), 7);

    let statuses: Vec<&str> = rows
        .iter()
        .map(|row| row["status"].as_str().expect("status"))
        .collect();
    assert_eq!(
        statuses,
        [
            "initial",
            "applied",
            "applied",
            "unchanged",
            "applied",
            "contradiction",
            "unknown_species"
        ]
    );

    let contradiction = &rows[5];
    assert_eq!(contradiction["contradiction"], "conflicting_reveal");
    assert_eq!(contradiction["observation"]["kind"], "item_revealed");
    // The failed reveal leaves the committed item untouched.
    let items = &contradiction["top"][1];
    assert_eq!(items["attribute"], "item");
    assert_eq!(items["candidates"][0]["value"], "Leftovers");
    assert_eq!(items["candidates"][0]["probability"], 1.0);

    for row in &rows[..6] {
        assert_eq!(row["top"].as_array().expect("rankings").len(), 5);
        assert!(row["metrics"]["confidence"].as_f64().is_some());
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("| kingambit_lead | Kingambit | 3 | 1 | 1 |"));
    assert!(markdown.contains("| ghost | Missingno | - |"));
}

#[test]
fn missing_corpus_is_reported() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path(), &dir.path().join("absent.json"));
    let outputs = config.resolved_outputs();

    let err = ReplayRunner::new(config, outputs)
        .err()
        .expect("corpus must exist");
    assert!(matches!(err, ReplayError::Corpus(_)));
}
