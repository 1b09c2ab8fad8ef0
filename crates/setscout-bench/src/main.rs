use std::path::PathBuf;

use clap::Parser;

use setscout_bench::config::{ReplayConfig, ResolvedOutputs};
use setscout_bench::logging::init_logging;
use setscout_bench::replay::ReplayRunner;

/// Replay harness for the set inference engine.
#[derive(Debug, Parser)]
#[command(
    name = "setscout-bench",
    author,
    version,
    about = "Replay scripted battle observations through the set inference engine"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/replay.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of candidates logged per attribute.
    #[arg(long, value_name = "COUNT")]
    top_n: Option<usize>,

    /// Override the usage corpus path.
    #[arg(long, value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Exit after validating the configuration (no scenario is replayed).
    #[arg(long)]
    validate_only: bool,

    /// Enable structured telemetry regardless of config.
    #[arg(long)]
    structured_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ReplayConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(top_n) = cli.top_n {
        config.top_n = top_n;
    }

    if let Some(corpus) = cli.corpus {
        config.corpus = corpus;
    }

    if cli.structured_logs {
        config.logging.enable_structured = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let scenario_count = config.scenarios.len();
    let run_id = config.run_id.clone();

    println!(
        "Loaded configuration '{run_id}' with {scenario_count} scenario{} (corpus {})",
        if scenario_count == 1 { "" } else { "s" },
        config.corpus.display()
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = ReplayRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: replay skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Replay complete for '{run_id}': {} scenarios, {} contradictions → {} rows at {}",
        summary.scenarios.len(),
        summary.contradictions,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    for (name, predicted) in summary.predictions() {
        println!(
            "  {name}: {} @ {} [{}]",
            predicted.species,
            predicted.item.as_deref().unwrap_or("?"),
            predicted.moves.join(", ")
        );
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
