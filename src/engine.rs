//! End-to-end timetabling engine.
//!
//! # Algorithm
//!
//! 1. Reject empty instructor/group lists and invalid limits.
//! 2. Classify the horizon into working and non-working days.
//! 3. Build the hard-constraint assignment model.
//! 4. Add the equity band (optional) and the load-spread objective.
//! 5. Solve once within the configured time and worker budget.
//! 6. If a solution exists, materialize rows and audit the grid.
//!
//! Only step 1-3 problems are errors. Every solver outcome, including
//! INFEASIBLE and UNKNOWN, is returned as data in [`EngineOutcome`].

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assignment::{AssignmentModelBuilder, EquityBand, FairnessController, WorkloadLimits};
use crate::config::EngineConfig;
use crate::cp::{CpSolution, CpSolver, HighsSolver, SolveStatus};
use crate::error::ConfigurationError;
use crate::materialize::ScheduleMaterializer;
use crate::models::{
    collect_holidays, CurriculumIndex, CurriculumSession, Environment, Group, HolidaySource,
    Instructor, SolvedAssignment, Timetable, WorkingCalendar,
};
use crate::validation::{audit_assignment, validate_input};

/// Input container for one run.
#[derive(Debug, Clone, Default)]
pub struct TimetableInput {
    /// Instructors; list order fixes the instructor index.
    pub instructors: Vec<Instructor>,
    /// Groups; list order fixes the group index.
    pub groups: Vec<Group>,
    /// Environments, used round-robin.
    pub environments: Vec<Environment>,
    /// Curriculum sessions.
    pub sessions: Vec<CurriculumSession>,
    /// Holiday dates (weekends are added automatically).
    pub holidays: HashSet<NaiveDate>,
}

impl TimetableInput {
    /// Creates an input without curriculum or holidays.
    pub fn new(
        instructors: Vec<Instructor>,
        groups: Vec<Group>,
        environments: Vec<Environment>,
    ) -> Self {
        Self {
            instructors,
            groups,
            environments,
            sessions: Vec::new(),
            holidays: HashSet::new(),
        }
    }

    /// Sets the curriculum.
    pub fn with_sessions(mut self, sessions: Vec<CurriculumSession>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Adds holiday dates.
    pub fn with_holidays<I: IntoIterator<Item = NaiveDate>>(mut self, holidays: I) -> Self {
        self.holidays.extend(holidays);
        self
    }
}

/// Solver and model figures for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveDiagnostics {
    /// Solver status.
    pub status: SolveStatus,
    /// Solver wall time.
    pub wall_time: Duration,
    /// Columns in the solved program, auxiliary ones included.
    pub model_columns: usize,
    /// Rows in the solved program.
    pub model_rows: usize,
    /// Best load spread, when a solution exists.
    pub objective: Option<i64>,
    /// groups × working days.
    pub expected_assignments: usize,
    pub working_days: usize,
    pub non_working_days: usize,
    /// Session length used for the weekly session cap.
    pub hours_per_session: u32,
    /// Weekly session cap per instructor.
    pub max_sessions_per_week: usize,
    /// Load targets; enforced only when `equity_enforced`.
    pub equity_band: EquityBand,
    pub equity_enforced: bool,
}

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct EngineOutcome {
    /// Solver status.
    pub status: SolveStatus,
    /// Rows and audit findings; empty unless a solution was found.
    pub timetable: Timetable,
    /// Solved grid, when a solution was found.
    pub assignment: Option<SolvedAssignment>,
    pub diagnostics: SolveDiagnostics,
}

impl EngineOutcome {
    /// Whether rows were produced.
    pub fn has_solution(&self) -> bool {
        self.assignment.is_some()
    }
}

/// Timetabling engine over a pluggable solver.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_timetable::config::EngineConfig;
/// use u_timetable::cp::{SolveStatus, SolverConfig};
/// use u_timetable::engine::{TimetableEngine, TimetableInput};
/// use u_timetable::models::{Environment, Group, Instructor};
///
/// let config = EngineConfig::new()
///     .with_start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
///     .with_num_days(7)
///     .with_solver(SolverConfig::new().with_time_limit_secs(10.0));
/// let input = TimetableInput::new(
///     vec![Instructor::new("Ana"), Instructor::new("Luis")],
///     vec![Group::new("G1")],
///     vec![Environment::new("Lab")],
/// );
///
/// let outcome = TimetableEngine::new(config).run(&input).unwrap();
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// assert_eq!(outcome.timetable.row_count(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableEngine<S = HighsSolver> {
    config: EngineConfig,
    solver: S,
}

impl TimetableEngine<HighsSolver> {
    /// Creates an engine backed by [`HighsSolver`].
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            solver: HighsSolver::new(),
        }
    }
}

impl<S: CpSolver> TimetableEngine<S> {
    /// Swaps the solver.
    pub fn with_solver<T: CpSolver>(self, solver: T) -> TimetableEngine<T> {
        TimetableEngine {
            config: self.config,
            solver,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Holidays from `source` for every year the configured horizon touches.
    pub fn collect_holidays<H: HolidaySource + ?Sized>(&self, source: &H) -> HashSet<NaiveDate> {
        collect_holidays(
            source,
            self.config.resolve_start_date(),
            self.config.num_days,
        )
    }

    /// Runs one full build-solve-materialize pass.
    ///
    /// # Errors
    /// [`ConfigurationError`] for empty instructor or group lists, invalid
    /// limits, or a horizon without working days. No model is built in
    /// those cases.
    pub fn run(&self, input: &TimetableInput) -> Result<EngineOutcome, ConfigurationError> {
        if input.instructors.is_empty() {
            return Err(ConfigurationError::NoInstructors);
        }
        if input.groups.is_empty() {
            return Err(ConfigurationError::NoGroups);
        }

        let curriculum = CurriculumIndex::new(input.sessions.clone());
        let hours_per_session = self
            .config
            .hours_per_session
            .unwrap_or_else(|| curriculum.hours_per_session());
        let limits = self.config.limits(hours_per_session);
        validate_input(
            &input.instructors,
            &input.groups,
            &input.environments,
            self.config.num_days,
            &limits,
        )
        .map_err(ConfigurationError::Invalid)?;

        for (trimester, sessions) in curriculum.bucket_sizes() {
            debug!(event = "curriculum_bucket", trimester = %trimester, sessions);
        }

        let calendar = WorkingCalendar::new(
            self.config.resolve_start_date(),
            self.config.num_days,
            &input.holidays,
        );
        let working_days = calendar.working_day_count();
        let mut model = AssignmentModelBuilder::new(
            &calendar,
            input.instructors.len(),
            input.groups.len(),
        )
        .with_limits(limits)
        .build()
        .inspect_err(|err| warn!(event = "configuration_rejected", error = %err))?;

        let fairness = FairnessController::new(self.config.force_equity);
        let band = fairness.apply(&mut model, working_days);

        info!(
            event = "timetable_start",
            start_date = %calendar.start_date(),
            num_days = calendar.num_days(),
            working_days,
            instructors = input.instructors.len(),
            groups = input.groups.len(),
            environments = input.environments.len(),
            hours_per_session,
            force_equity = self.config.force_equity,
        );

        let solution = self.solver.solve(model.model(), &self.config.solver);
        let assignment = model.extract(&solution);

        let mut timetable = Timetable::default();
        if let Some(grid) = &assignment {
            timetable.rows = ScheduleMaterializer::new(
                &calendar,
                &input.instructors,
                &input.groups,
                &input.environments,
                &curriculum,
            )
            .materialize(grid);
            let audited_band = fairness.force_equity().then_some(&band);
            timetable.violations = audit_assignment(grid, &calendar, &limits, audited_band);
            if !timetable.is_valid() {
                warn!(
                    event = "audit_failed",
                    violations = timetable.violations.len(),
                    first = %timetable.violations[0].message,
                );
            }
        }

        let diagnostics = self.diagnostics(&solution, &calendar, &limits, band);
        info!(
            event = "timetable_end",
            status = %solution.status,
            rows = timetable.row_count(),
            objective = solution.objective,
            wall_time_ms = diagnostics.wall_time.as_millis() as u64,
        );

        Ok(EngineOutcome {
            status: solution.status,
            timetable,
            assignment,
            diagnostics,
        })
    }

    fn diagnostics(
        &self,
        solution: &CpSolution,
        calendar: &WorkingCalendar,
        limits: &WorkloadLimits,
        band: EquityBand,
    ) -> SolveDiagnostics {
        SolveDiagnostics {
            status: solution.status,
            wall_time: solution.stats.wall_time,
            model_columns: solution.stats.columns,
            model_rows: solution.stats.rows,
            objective: solution.objective,
            expected_assignments: band.total_required,
            working_days: calendar.working_day_count(),
            non_working_days: calendar.non_working_days().len(),
            hours_per_session: limits.hours_per_session,
            max_sessions_per_week: limits.max_sessions_per_week(),
            equity_band: band,
            equity_enforced: self.config.force_equity,
        }
    }
}
