mod summary;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use setscout_core::belief::telemetry::BeliefMetrics;
use setscout_core::{
    ApplyOutcome, AttributeKind, BeliefState, Candidate, ContradictionKind, CorpusError,
    CorrelationError, CorrelationTable, Engine, Observation, PredictedSet, UsageCorpus,
};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ReplayConfig, ResolvedOutputs, ScenarioConfig};

pub use summary::ScenarioSummary;

/// Replays scripted observation sequences through the engine.
pub struct ReplayRunner {
    config: ReplayConfig,
    outputs: ResolvedOutputs,
    engine: Engine,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub scenarios: Vec<ScenarioSummary>,
    pub rows_written: usize,
    pub contradictions: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum StepStatus {
    Initial,
    Applied,
    Unchanged,
    Contradiction,
    UnknownSpecies,
}

impl From<ApplyOutcome> for StepStatus {
    fn from(outcome: ApplyOutcome) -> Self {
        match outcome {
            ApplyOutcome::Applied => StepStatus::Applied,
            ApplyOutcome::Unchanged => StepStatus::Unchanged,
        }
    }
}

#[derive(Debug, Serialize)]
struct AttributeRanking {
    attribute: AttributeKind,
    candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
struct StepLogRow<'a> {
    run_id: &'a str,
    scenario: &'a str,
    species: &'a str,
    step: usize,
    status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    observation: Option<&'a Observation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contradiction: Option<ContradictionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<BeliefMetrics>,
    top: Vec<AttributeRanking>,
}

impl ReplayRunner {
    /// Build a runner from a validated configuration, loading the corpus and
    /// correlation table from disk.
    pub fn new(config: ReplayConfig, outputs: ResolvedOutputs) -> Result<Self, ReplayError> {
        let corpus = UsageCorpus::from_path(&config.corpus)?;
        let correlations = match config.correlations.as_ref() {
            Some(path) => CorrelationTable::from_path(path)?,
            None => CorrelationTable::standard(),
        };
        let engine = Engine::new(corpus)
            .with_correlations(correlations)
            .with_config(config.soft_config())
            .with_bans(
                config
                    .bans()
                    .map(|(attribute, value)| (attribute, value.to_string())),
            );
        Ok(Self::with_engine(config, outputs, engine))
    }

    /// Build a runner around an already configured engine.
    pub fn with_engine(config: ReplayConfig, outputs: ResolvedOutputs, engine: Engine) -> Self {
        Self {
            config,
            outputs,
            engine,
        }
    }

    /// Execute every scenario, streaming one JSONL row per step to disk.
    ///
    /// Contradictions and unknown species are recorded and the run moves on.
    pub fn run(&self) -> Result<RunSummary, ReplayError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rows_written = 0usize;
        let mut scenarios = Vec::with_capacity(self.config.scenarios.len());

        for scenario in &self.config.scenarios {
            let (summary, rows) = self.replay_scenario(&mut writer, scenario)?;
            event!(
                target: "setscout_bench::replay",
                Level::INFO,
                run_id = %self.config.run_id,
                scenario = %summary.name,
                species = %summary.species,
                applied = summary.applied as u32,
                unchanged = summary.unchanged as u32,
                contradictions = summary.contradictions as u32,
                confidence = summary.final_confidence.unwrap_or(0.0),
            );
            rows_written += rows;
            scenarios.push(summary);
        }

        writer.flush()?;
        summary::write_markdown(&self.outputs.summary_md, &self.config.run_id, &scenarios)?;

        let contradictions = scenarios.iter().map(|s| s.contradictions).sum();
        Ok(RunSummary {
            scenarios,
            rows_written,
            contradictions,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn replay_scenario(
        &self,
        writer: &mut BufWriter<File>,
        scenario: &ScenarioConfig,
    ) -> Result<(ScenarioSummary, usize), ReplayError> {
        let mut summary = ScenarioSummary::new(&scenario.name, &scenario.species);

        let space = match self.engine.build_configuration_space(&scenario.species) {
            Ok(space) => space,
            Err(err) => {
                event!(
                    target: "setscout_bench::replay",
                    Level::WARN,
                    run_id = %self.config.run_id,
                    scenario = %scenario.name,
                    error = %err,
                );
                let row = StepLogRow {
                    run_id: &self.config.run_id,
                    scenario: &scenario.name,
                    species: &scenario.species,
                    step: 0,
                    status: StepStatus::UnknownSpecies,
                    observation: None,
                    contradiction: None,
                    error: Some(err.to_string()),
                    metrics: None,
                    top: Vec::new(),
                };
                write_row(writer, &row)?;
                summary.error = Some(err.to_string());
                return Ok((summary, 1));
            }
        };

        let mut state = self.engine.new_belief_state(Arc::clone(&space));
        let mut rows = 0usize;
        self.write_state_row(writer, scenario, &state, 0, StepStatus::Initial, None)?;
        rows += 1;

        for (index, observation) in scenario.observations.iter().enumerate() {
            let step = index + 1;
            match self.engine.apply_observation(&mut state, observation) {
                Ok(outcome) => {
                    match outcome {
                        ApplyOutcome::Applied => summary.applied += 1,
                        ApplyOutcome::Unchanged => summary.unchanged += 1,
                    }
                    self.write_state_row(
                        writer,
                        scenario,
                        &state,
                        step,
                        outcome.into(),
                        Some(observation),
                    )?;
                }
                Err(err) => {
                    summary.contradictions += 1;
                    let row = StepLogRow {
                        run_id: &self.config.run_id,
                        scenario: &scenario.name,
                        species: space.species(),
                        step,
                        status: StepStatus::Contradiction,
                        observation: Some(observation),
                        contradiction: Some(err.kind),
                        error: Some(err.to_string()),
                        metrics: Some(BeliefMetrics::from_state(&state)),
                        top: self.rankings(&state),
                    };
                    write_row(writer, &row)?;
                }
            }
            rows += 1;
        }

        summary.final_confidence = Some(self.engine.confidence_score(&state));
        summary.predicted = Some(self.engine.most_likely(&state));
        Ok((summary, rows))
    }

    fn write_state_row(
        &self,
        writer: &mut BufWriter<File>,
        scenario: &ScenarioConfig,
        state: &BeliefState,
        step: usize,
        status: StepStatus,
        observation: Option<&Observation>,
    ) -> Result<(), ReplayError> {
        let row = StepLogRow {
            run_id: &self.config.run_id,
            scenario: &scenario.name,
            species: state.species(),
            step,
            status,
            observation,
            contradiction: None,
            error: None,
            metrics: Some(BeliefMetrics::from_state(state)),
            top: self.rankings(state),
        };
        write_row(writer, &row)
    }

    fn rankings(&self, state: &BeliefState) -> Vec<AttributeRanking> {
        AttributeKind::ALL
            .iter()
            .map(|&attribute| AttributeRanking {
                attribute,
                candidates: self
                    .engine
                    .top_candidates(state, attribute, self.config.top_n),
            })
            .collect()
    }
}

impl RunSummary {
    /// Final predicted set per scenario that resolved to a known species.
    pub fn predictions(&self) -> impl Iterator<Item = (&str, &PredictedSet)> {
        self.scenarios.iter().filter_map(|scenario| {
            scenario
                .predicted
                .as_ref()
                .map(|predicted| (scenario.name.as_str(), predicted))
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), ReplayError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_row(writer: &mut BufWriter<File>, row: &StepLogRow<'_>) -> Result<(), ReplayError> {
    serde_json::to_writer(&mut *writer, row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("{0}")]
    Corpus(#[from] CorpusError),
    #[error("{0}")]
    Correlation(#[from] CorrelationError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
