use serde::Deserialize;
use setscout_core::{AttributeKind, Observation, SoftConfig};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_TOP_N: usize = 3;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root replay configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReplayConfig {
    pub run_id: String,
    pub corpus: PathBuf,
    /// Correlation table on disk; the built-in table is used when absent.
    #[serde(default)]
    pub correlations: Option<PathBuf>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub banned: Vec<BanConfig>,
    pub scenarios: Vec<ScenarioConfig>,
    pub outputs: OutputsConfig,
    /// Soft rule magnitudes; `SETSCOUT_*` environment overrides apply when absent.
    #[serde(default)]
    pub engine: Option<SoftConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReplayConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ReplayConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        if self.corpus.as_os_str().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "corpus".to_string(),
                message: "corpus path must not be empty".to_string(),
            });
        }
        if self.top_n == 0 {
            return Err(ValidationError::InvalidField {
                field: "top_n".to_string(),
                message: "top_n must be greater than zero".to_string(),
            });
        }
        for (index, ban) in self.banned.iter().enumerate() {
            if ban.value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: format!("banned[{index}].value"),
                    message: "banned value must not be empty".to_string(),
                });
            }
        }
        if let Some(engine) = self.engine.as_ref() {
            engine
                .validate()
                .map_err(|err| ValidationError::InvalidField {
                    field: "engine".to_string(),
                    message: err.to_string(),
                })?;
        }
        validate_scenarios(&self.scenarios)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }

    pub fn soft_config(&self) -> SoftConfig {
        self.engine.unwrap_or_else(SoftConfig::from_env)
    }

    pub fn bans(&self) -> impl Iterator<Item = (AttributeKind, &str)> {
        self.banned
            .iter()
            .map(|ban| (ban.attribute, ban.value.as_str()))
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// A value excluded from every species' domain (format clauses).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BanConfig {
    pub attribute: AttributeKind,
    pub value: String,
}

/// One opponent entity and the observations revealed about it, in order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_scenarios(scenarios: &[ScenarioConfig]) -> Result<(), ValidationError> {
    if scenarios.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "scenarios".to_string(),
            message: "at least one scenario must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for scenario in scenarios {
        if scenario.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "scenarios.name".to_string(),
                message: "scenario name must not be empty".to_string(),
            });
        }

        if scenario.species.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: format!("scenarios[{}].species", scenario.name),
                message: "species must not be empty".to_string(),
            });
        }

        if !seen.insert(scenario.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "scenarios".to_string(),
                message: format!("scenario name '{}' defined more than once", scenario.name),
            });
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
