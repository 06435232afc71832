//! Engine configuration.
//!
//! Loaded from TOML or built in code. Every field has a default, so an
//! empty document is a valid configuration.
//!
//! ```
//! use u_timetable::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     start_date = "2024-01-15"
//!     num_days = 28
//!     force_equity = false
//!
//!     [solver]
//!     time_limit_secs = 30.0
//!     num_workers = 4
//! "#).unwrap();
//!
//! assert_eq!(config.num_days, 28);
//! assert_eq!(config.max_weekly_hours, 40);
//! assert_eq!(config.solver.num_workers, 4);
//! ```

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assignment::WorkloadLimits;
use crate::cp::SolverConfig;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Timetabling run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First day of the horizon; `None` means today.
    pub start_date: Option<NaiveDate>,
    /// Horizon length in days.
    pub num_days: usize,
    /// Weekly teaching hours per instructor.
    pub max_weekly_hours: u32,
    /// Working days an instructor may teach per 7-day window.
    pub max_working_days_per_week: u32,
    /// Session length; `None` derives it from the curriculum.
    pub hours_per_session: Option<u32>,
    /// Confine every load to the equity band.
    pub force_equity: bool,
    /// Search parameters.
    pub solver: SolverConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            num_days: 75,
            max_weekly_hours: 40,
            max_working_days_per_week: 6,
            hours_per_session: None,
            force_equity: true,
            solver: SolverConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_num_days(mut self, days: usize) -> Self {
        self.num_days = days;
        self
    }

    pub fn with_max_weekly_hours(mut self, hours: u32) -> Self {
        self.max_weekly_hours = hours;
        self
    }

    pub fn with_max_working_days_per_week(mut self, days: u32) -> Self {
        self.max_working_days_per_week = days;
        self
    }

    /// Fixes the session length instead of deriving it.
    pub fn with_hours_per_session(mut self, hours: u32) -> Self {
        self.hours_per_session = Some(hours);
        self
    }

    pub fn with_force_equity(mut self, enabled: bool) -> Self {
        self.force_equity = enabled;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Start date, falling back to today's local date.
    pub fn resolve_start_date(&self) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Workload limits for a given session length.
    pub fn limits(&self, hours_per_session: u32) -> WorkloadLimits {
        WorkloadLimits {
            max_weekly_hours: self.max_weekly_hours,
            max_working_days_per_week: self.max_working_days_per_week,
            hours_per_session,
        }
    }
}
