use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_INPUT_PATH, DEFAULT_REPORT_ROWS, INPUT_PATH_ENV};
use crate::error::{ReportError, Result};
use crate::pipeline::processing::destructiveness::ScoringConfig;

/// Run configuration, loaded from an optional TOML file.
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// run over `data/meteorites.csv` with the stock scoring rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub ingest: IngestConfig,
    pub enrich: EnrichConfig,
    pub scoring: ScoringConfig,
    pub report: ReportConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_INPUT_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Accept `MM/DD/YYYY hh:mm:ss AM` timestamps in the year column
    pub lenient_year: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Look up each distinct coordinate pair only once per run
    pub memoize: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self { memoize: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows shown per checkpoint table
    pub rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_REPORT_ROWS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Where to write the Prometheus text snapshot at the end of a run
    pub metrics_snapshot: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `meteor_report.toml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Override the input path from `METEOR_INPUT_PATH` when it is set and non-blank
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(INPUT_PATH_ENV) {
            if !value.trim().is_empty() {
                debug!("Input path overridden by {}", INPUT_PATH_ENV);
                self.input.path = PathBuf::from(value.trim());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.report.rows == 0 {
            return Err(ReportError::Config("report.rows must be at least 1".to_string()));
        }
        self.scoring.validate()
    }
}
