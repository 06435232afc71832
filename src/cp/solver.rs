//! Solver driver: parameters, status codes, the solver seam.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::model::{BoolVar, CpModel};

/// Search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock budget in seconds.
    pub time_limit_secs: f64,
    /// Solver threads.
    ///
    /// HiGHS sizes its thread pool once per process, so every run in one
    /// process should use the same value.
    pub num_workers: usize,
    /// Seed for the solver's randomized heuristics.
    pub random_seed: u64,
    /// Let the backend print its own search log.
    pub log_search_progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 120.0,
            num_workers: 8,
            random_seed: 0,
            log_search_progress: false,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration (120 s, 8 workers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit.
    pub fn with_time_limit_secs(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets the worker count.
    pub fn with_num_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Enables the backend search log.
    pub fn with_search_logging(mut self, enabled: bool) -> Self {
        self.log_search_progress = enabled;
        self
    }

    /// Time limit as a `Duration`. Non-positive or NaN limits are zero.
    pub fn time_limit(&self) -> Duration {
        if self.time_limit_secs.is_nan() || self.time_limit_secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::MAX)
    }

    /// Effective worker count (at least 1).
    pub fn workers(&self) -> usize {
        self.num_workers.max(1)
    }
}

/// Terminal solver status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Best possible objective proven.
    Optimal,
    /// A solution exists but optimality is unproven.
    Feasible,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The model failed structural validation.
    ModelInvalid,
    /// The budget ran out before any solution or proof.
    Unknown,
}

impl SolveStatus {
    /// Whether this status carries a usable assignment.
    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// Upper-case status name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::ModelInvalid => "MODEL_INVALID",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Elapsed wall time.
    pub wall_time: Duration,
    /// Columns handed to the backend, auxiliary ones included.
    pub columns: usize,
    /// Rows handed to the backend.
    pub rows: usize,
    /// Threads requested.
    pub workers: usize,
}

/// Result of a solve call.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Terminal status.
    pub status: SolveStatus,
    /// Variable values; empty unless `status.has_solution()`.
    pub values: Vec<bool>,
    /// Objective of the returned assignment.
    pub objective: Option<i64>,
    /// Run statistics.
    pub stats: SolverStats,
}

impl CpSolution {
    pub(crate) fn without_values(status: SolveStatus, stats: SolverStats) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            stats,
        }
    }

    /// Whether an assignment is available.
    pub fn is_solution_found(&self) -> bool {
        self.status.has_solution() && !self.values.is_empty()
    }

    /// Value of a variable (false when no solution).
    pub fn value(&self, var: BoolVar) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }
}

/// A solver for [`CpModel`]s.
pub trait CpSolver {
    /// Solves `model` within the budget in `config`. Never retries.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit(), Duration::from_secs(120));
        assert_eq!(config.workers(), 8);
        assert_eq!(SolverConfig::new().with_num_workers(0).workers(), 1);
        assert_eq!(
            SolverConfig::new().with_time_limit_secs(-1.0).time_limit(),
            Duration::ZERO
        );
        assert_eq!(
            SolverConfig::new().with_time_limit_secs(f64::NAN).time_limit(),
            Duration::ZERO
        );
    }

    #[test]
    fn test_status_names() {
        assert_eq!(SolveStatus::ModelInvalid.to_string(), "MODEL_INVALID");
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
        assert_eq!(
            serde_json::to_string(&SolveStatus::Optimal).unwrap(),
            "\"OPTIMAL\""
        );
    }

    #[test]
    fn test_empty_solution_reads_false() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a");
        let solution = CpSolution::without_values(SolveStatus::Unknown, SolverStats::default());
        assert!(!solution.is_solution_found());
        assert!(!solution.value(a));
    }
}
