//! Configuration management for the calorie tracker
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: CT__)

use crate::error::{TrackerError, TrackerResult};
use calorie_tracker_shared::{EnergyUnit, MAX_PERIOD_DAYS};
use serde::{Deserialize, Serialize};
use std::env;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Log output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "calorie_tracker=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Output display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub energy_unit: EnergyUnit,
}

/// Summary cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entries kept per memo table
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 64 }
    }
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Days covered by `report` and `export` when no start date is given
    pub period_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { period_days: 7 }
    }
}

impl TrackerConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with CT__ prefix
    pub fn load() -> TrackerResult<Self> {
        Self::load_for(&Self::environment())
    }

    /// Load configuration for a named environment
    pub fn load_for(environment: &str) -> TrackerResult<Self> {
        let config_file = format!("config/{}.toml", environment);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&TrackerConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (CT__ prefix)
            // e.g., CT__DISPLAY__ENERGY_UNIT=kj sets display.energy_unit
            .add_source(config::Environment::with_prefix("CT").separator("__"))
            .build()?;

        let loaded: TrackerConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values the tracker cannot work with
    pub fn validate(&self) -> TrackerResult<()> {
        if self.cache.max_entries == 0 {
            return Err(TrackerError::InvalidConfig(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PERIOD_DAYS).contains(&self.report.period_days) {
            return Err(TrackerError::InvalidConfig(format!(
                "report.period_days must be between 1 and {}",
                MAX_PERIOD_DAYS
            )));
        }
        Ok(())
    }

    /// Current environment name from RUST_ENV
    pub fn environment() -> String {
        env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.logging.format == LogFormat::Json || Self::is_production()
    }

    /// Render as TOML, the format of the config files
    pub fn to_toml(&self) -> TrackerResult<String> {
        toml::to_string_pretty(self).map_err(|e| TrackerError::InvalidConfig(e.to_string()))
    }
}
