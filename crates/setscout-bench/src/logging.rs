use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Level, event};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

const LOGGED_CRATES: [&str; 2] = ["setscout_core", "setscout_bench"];

/// Route engine and harness tracing events into `telemetry.jsonl` next to the
/// summary table.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_dir = outputs
        .summary_md
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&telemetry_dir).with_context(|| {
        format!(
            "creating telemetry directory at {}",
            telemetry_dir.display()
        )
    })?;

    let telemetry_path = telemetry_dir.join("telemetry.jsonl");
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A global subscriber may already be installed when running under tests.
    let _ = tracing::subscriber::set_global_default(subscriber);
    event!(
        target: "setscout_bench::replay",
        Level::INFO,
        run_id,
        telemetry = %telemetry_path.display(),
        "structured telemetry enabled"
    );

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

/// Only this workspace's crates log at `level`; dependencies stay at WARN.
fn default_directives(level: Level) -> String {
    let mut directives = String::from("warn");
    for target in LOGGED_CRATES {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level.as_str());
    }
    directives
}
