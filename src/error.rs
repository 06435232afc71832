//! Engine-level error types.
//!
//! Only configuration problems are errors. Solver outcomes
//! (infeasible, unknown, invalid model) are reported as data through
//! [`SolveStatus`](crate::cp::SolveStatus) and never abort a run.

use thiserror::Error;

use crate::validation::ValidationError;

pub use crate::config::ConfigError;
pub use crate::cp::ModelError;
pub use crate::models::HolidayError;

/// Input or configuration problem detected before any model is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Every day in the horizon is a weekend or holiday.
    #[error("no working days in a {num_days}-day horizon ({non_working} non-working)")]
    NoWorkingDays { num_days: usize, non_working: usize },

    /// The instructor list is empty.
    #[error("at least one instructor is required")]
    NoInstructors,

    /// The group list is empty.
    #[error("at least one group is required")]
    NoGroups,

    /// One or more structural input checks failed.
    #[error("invalid input: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),
}

impl ConfigurationError {
    /// Stable status code for reporting alongside solver statuses.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::NoWorkingDays { .. } => "NO_WORKING_DAYS",
            Self::NoInstructors => "NO_INSTRUCTORS",
            Self::NoGroups => "NO_GROUPS",
            Self::Invalid(_) => "INVALID_INPUT",
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
