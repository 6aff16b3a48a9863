//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::DEFAULT_CONFIDENCE_LEVEL;
use crate::models::TierThresholds;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Confidence level for win-rate intervals
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Worker count for parallel aggregation (default: host parallelism)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Build profiles with a single sequential fold
    #[serde(default)]
    pub sequential: bool,
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            workers: None,
            sequential: false,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Character and rank name tables (TOML)
    #[serde(default)]
    pub tables_path: Option<PathBuf>,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub tiers: TierThresholds,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tables_path: None,
            analysis: AnalysisConfig::default(),
            tiers: TierThresholds::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.analysis.confidence_level;
        if !(level > 0.0 && level < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "Confidence level must be between 0 and 1 (exclusive), got {}",
                level
            )));
        }

        if self.analysis.workers == Some(0) {
            return Err(ConfigError::ValidationError(
                "Worker count must be greater than 0".to_string(),
            ));
        }

        if !self.tiers.is_ordered() {
            return Err(ConfigError::ValidationError(format!(
                "Tier thresholds must be strictly increasing, got {}/{}/{}",
                self.tiers.beginner_max, self.tiers.intermediate_max, self.tiers.advanced_max
            )));
        }

        Ok(())
    }
}
