//! Input validation and solution auditing for timetabling problems.
//!
//! Pre-solve, [`validate_input`] checks structural integrity of the
//! inputs and limits. Detects:
//! - Empty instructor, group, or environment lists
//! - An empty horizon
//! - Zero-hour sessions
//! - A weekly working-day cap outside 1..=7
//!
//! Post-solve, [`audit_assignment`] re-checks every timetable invariant
//! against a solved grid and reports each breach as a [`Violation`].

use crate::assignment::{EquityBand, WorkloadLimits};
use crate::models::{
    Environment, Group, Instructor, SolvedAssignment, Violation, WorkingCalendar, WEEK_LENGTH,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No instructors supplied.
    NoInstructors,
    /// No groups supplied.
    NoGroups,
    /// No environments supplied.
    NoEnvironments,
    /// `num_days` is zero.
    EmptyHorizon,
    /// `hours_per_session` is zero.
    ZeroSessionHours,
    /// `max_working_days_per_week` outside 1..=7.
    WorkingDayCapOutOfRange,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a timetabling problem.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    instructors: &[Instructor],
    groups: &[Group],
    environments: &[Environment],
    num_days: usize,
    limits: &WorkloadLimits,
) -> ValidationResult {
    let mut errors = Vec::new();

    if instructors.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoInstructors,
            "no instructors supplied",
        ));
    }
    if groups.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoGroups,
            "no groups supplied",
        ));
    }
    if environments.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoEnvironments,
            "no environments supplied",
        ));
    }
    if num_days == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyHorizon,
            "num_days is 0",
        ));
    }
    if limits.hours_per_session == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroSessionHours,
            "hours_per_session is 0",
        ));
    }
    if !(1..=WEEK_LENGTH as u32).contains(&limits.max_working_days_per_week) {
        errors.push(ValidationError::new(
            ValidationErrorKind::WorkingDayCapOutOfRange,
            format!(
                "max_working_days_per_week {} outside 1..=7",
                limits.max_working_days_per_week
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Re-checks a solved grid against the timetable invariants.
///
/// Checks, in order:
/// 1. Each working (day, group) has exactly one instructor
/// 2. No instructor teaches two groups on one day
/// 3. Nothing is scheduled on non-working days
/// 4. Weekly session and worked-day caps per 7-day window
/// 5. Loads inside the equity band, when one is given
pub fn audit_assignment(
    assignment: &SolvedAssignment,
    calendar: &WorkingCalendar,
    limits: &WorkloadLimits,
    band: Option<&EquityBand>,
) -> Vec<Violation> {
    let ni = assignment.num_instructors();
    let nd = assignment.num_days().min(calendar.num_days());
    let ng = assignment.num_groups();
    let mut violations = Vec::new();

    for d in 0..nd {
        let working = calendar.is_working(d);
        for g in 0..ng {
            let covering = assignment.instructors_for(d, g);
            if working && covering.len() != 1 {
                violations.push(Violation::coverage_gap(d, g, covering.len()));
            }
            if !working {
                for i in covering {
                    violations.push(Violation::non_working_day(i, d, g));
                }
            }
        }
        for i in 0..ni {
            let sessions = assignment.sessions_on(i, d);
            if sessions > 1 {
                violations.push(Violation::double_booking(i, d, sessions));
            }
        }
    }

    let session_cap = limits.max_sessions_per_week();
    let day_cap = limits.max_working_days_per_week as usize;
    for week in calendar.weeks() {
        let week_start = week.start;
        for i in 0..ni {
            let mut sessions = 0;
            let mut days = 0;
            for d in week.clone().filter(|&d| d < nd) {
                let n = assignment.sessions_on(i, d);
                sessions += n;
                if n > 0 && calendar.is_working(d) {
                    days += 1;
                }
            }
            if sessions > session_cap {
                violations.push(Violation::weekly_sessions(i, week_start, sessions, session_cap));
            }
            if days > day_cap {
                violations.push(Violation::weekly_days(i, week_start, days, day_cap));
            }
        }
    }

    if let Some(band) = band {
        for i in 0..ni {
            let load = assignment.load(i);
            if !band.contains(load) {
                violations.push(Violation::equity_band(i, load, band.lower(), band.upper()));
            }
        }
    }

    violations
}
