//! Serializable analysis configuration.

use capm_core::analytics::TRADING_DAYS_PER_YEAR;
use capm_core::{CapmParams, InstrumentId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for an analysis run (content-addressable hash of its config).
pub type RunId = String;

pub const DEFAULT_INSTRUMENTS: [&str; 4] = ["TSLA", "AAPL", "AMZN", "GOOGL"];
pub const DEFAULT_BENCHMARK: &str = "^GSPC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything needed to reproduce one analysis run.
///
/// ```toml
/// instruments = ["TSLA", "AAPL", "AMZN", "GOOGL"]
/// benchmark = "^GSPC"
/// window_years = 3
/// risk_free_rate = 0.0
/// trading_days_per_year = 252
/// today = "2024-06-30"   # optional, defaults to the local date
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Instruments to analyze, in display order.
    pub instruments: Vec<InstrumentId>,

    /// Reference index every instrument is regressed against.
    pub benchmark: InstrumentId,

    /// Length of the historical window, in years.
    pub window_years: u32,

    /// Annual risk-free rate as a fraction.
    pub risk_free_rate: f64,

    /// Annualization factor for the mean daily benchmark return.
    pub trading_days_per_year: u32,

    /// Reference date the window ends on (exclusive). `None` means today.
    pub today: Option<NaiveDate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| InstrumentId::from(*s)).collect(),
            benchmark: InstrumentId::from(DEFAULT_BENCHMARK),
            window_years: 1,
            risk_free_rate: 0.0,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            today: None,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::Invalid("at least one instrument is required".into()));
        }
        let mut seen = HashSet::new();
        for id in &self.instruments {
            if id.as_str().trim().is_empty() {
                return Err(ConfigError::Invalid("instrument symbols must not be blank".into()));
            }
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::Invalid(format!("instrument {id} is listed twice")));
            }
        }
        if self.benchmark.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid("benchmark symbol must not be blank".into()));
        }
        if seen.contains(self.benchmark.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "benchmark {} is also listed as an instrument",
                self.benchmark
            )));
        }
        if self.window_years < 1 {
            return Err(ConfigError::Invalid("window_years must be at least 1".into()));
        }
        if self.trading_days_per_year < 1 {
            return Err(ConfigError::Invalid(
                "trading_days_per_year must be at least 1".into(),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::Invalid("risk_free_rate must be finite".into()));
        }
        Ok(())
    }

    pub fn capm_params(&self) -> CapmParams {
        CapmParams {
            risk_free_rate: self.risk_free_rate,
            trading_days_per_year: self.trading_days_per_year,
        }
    }

    /// Deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId; `today` is part of the hash, so
    /// an unpinned config hashes differently once resolved to a date.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
