//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! section is optional; a missing file section falls back to its defaults.
//!
//! # Example
//!
//! ```no_run
//! use stacksmith::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::optimizer::OptimizerConfig;
use crate::domain::{ContestRules, MAX_LINEUPS, MIN_LINEUPS};
use crate::engine::{EngineSettings, LeverageConfig};
use crate::error::{ConfigError, Result};

/// `[contest]` section: default rules plus the portfolio size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContestConfig {
    /// Lineups to generate per request.
    #[serde(default = "default_lineups")]
    pub lineups: usize,

    #[serde(flatten)]
    pub rules: ContestRules,
}

fn default_lineups() -> usize {
    1
}

impl Default for ContestConfig {
    fn default() -> Self {
        Self {
            lineups: default_lineups(),
            rules: ContestRules::default(),
        }
    }
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Time budget and captain search settings.
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Ownership discount coefficients per strategy mode.
    #[serde(default)]
    pub leverage: LeverageConfig,

    /// Default contest rules for the CLI.
    #[serde(default)]
    pub contest: ContestConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize the global tracing subscriber from `[logging]`.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Engine knobs derived from `[optimizer]` and `[leverage]`.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            leverage: self.leverage,
            captain_candidates: self.optimizer.captain_candidates,
            worker_threads: self.optimizer.worker_threads,
        }
    }

    /// Validate values that do not depend on a player pool.
    ///
    /// Pool-dependent checks (locked captain membership, limits against
    /// stacking requirements) run again in the engine per request.
    pub fn validate(&self) -> Result<()> {
        let optimizer = &self.optimizer;
        if !optimizer.soft_time_limit_secs.is_finite() || optimizer.soft_time_limit_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "soft_time_limit_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !optimizer.hard_time_limit_secs.is_finite()
            || optimizer.hard_time_limit_secs < optimizer.soft_time_limit_secs
        {
            return Err(ConfigError::InvalidValue {
                field: "hard_time_limit_secs",
                reason: "must be >= soft_time_limit_secs".to_string(),
            }
            .into());
        }
        if optimizer.captain_candidates == 0 {
            return Err(ConfigError::InvalidValue {
                field: "captain_candidates",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        for (field, value) in [
            ("leverage.balanced", self.leverage.balanced),
            ("leverage.contrarian", self.leverage.contrarian),
            ("leverage.tournament", self.leverage.tournament),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be a non-negative number".to_string(),
                }
                .into());
            }
        }

        let contest = &self.contest;
        if !(MIN_LINEUPS..=MAX_LINEUPS).contains(&contest.lineups) {
            return Err(ConfigError::InvalidValue {
                field: "lineups",
                reason: format!("must be between {MIN_LINEUPS} and {MAX_LINEUPS}"),
            }
            .into());
        }
        if contest.rules.salary_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "salary_cap",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&contest.rules.max_avg_ownership) {
            return Err(ConfigError::InvalidValue {
                field: "max_avg_ownership",
                reason: "must be between 0 and 1".to_string(),
            }
            .into());
        }
        if contest.rules.locked_captain_id.is_some() && !contest.rules.structure.is_showdown() {
            return Err(ConfigError::InvalidValue {
                field: "locked_captain_id",
                reason: "only applies to showdown contests".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
