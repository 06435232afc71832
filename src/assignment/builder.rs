//! Assignment model construction.
//!
//! Translates a working calendar and the instructor/group counts into a
//! 0-1 model over `x[i, d, g]` ("instructor `i` teaches group `g`
//! on day `d`") with these hard rules:
//!
//! 1. Non-working days carry no assignments.
//! 2. Each working (day, group) cell has exactly one instructor.
//! 3. An instructor teaches at most one group per day.
//! 4. Per 7-day window, an instructor teaches at most
//!    `max_weekly_hours / hours_per_session` sessions.
//! 5. Per 7-day window, an instructor works at most
//!    `max_working_days_per_week` working days, tracked through an
//!    indicator `w[i, d] = Σ_g x[i, d, g]`. Rule 3 keeps the sum in
//!    {0, 1}, so `w` is true exactly when `i` teaches on `d`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cp::{BoolVar, CpModel, CpSolution, LinearExpr};
use crate::error::ConfigurationError;
use crate::models::{SolvedAssignment, WorkingCalendar};

/// Per-instructor workload limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadLimits {
    /// Weekly teaching hours.
    pub max_weekly_hours: u32,
    /// Working days an instructor may teach per 7-day window.
    pub max_working_days_per_week: u32,
    /// Length of one session in hours.
    pub hours_per_session: u32,
}

impl Default for WorkloadLimits {
    fn default() -> Self {
        Self {
            max_weekly_hours: 40,
            max_working_days_per_week: 6,
            hours_per_session: 4,
        }
    }
}

impl WorkloadLimits {
    /// Sessions allowed per 7-day window: `floor(max_weekly_hours / max(1, hours_per_session))`.
    pub fn max_sessions_per_week(&self) -> usize {
        (self.max_weekly_hours / self.hours_per_session.max(1)) as usize
    }
}

/// A built assignment model with its variable layout.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    model: CpModel,
    cells: Vec<BoolVar>,
    worked: Vec<Option<BoolVar>>,
    num_instructors: usize,
    num_days: usize,
    num_groups: usize,
}

impl AssignmentModel {
    /// Underlying CP model.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Mutable access for adding fairness rules.
    pub fn model_mut(&mut self) -> &mut CpModel {
        &mut self.model
    }

    pub fn num_instructors(&self) -> usize {
        self.num_instructors
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// Variable `x[i, d, g]`.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    pub fn var(&self, instructor: usize, day: usize, group: usize) -> BoolVar {
        self.cells[(instructor * self.num_days + day) * self.num_groups + group]
    }

    /// Indicator `w[i, d]`; `None` on non-working days.
    pub fn worked(&self, instructor: usize, day: usize) -> Option<BoolVar> {
        self.worked
            .get(instructor * self.num_days + day)
            .copied()
            .flatten()
    }

    /// `Σ_{d,g} x[i, d, g]`.
    pub fn load_expr(&self, instructor: usize) -> LinearExpr {
        let start = instructor * self.num_days * self.num_groups;
        let end = start + self.num_days * self.num_groups;
        LinearExpr::sum(self.cells[start..end].iter().copied())
    }

    /// Reads the decision grid out of a solver result.
    ///
    /// Returns `None` when the solver produced no assignment.
    pub fn extract(&self, solution: &CpSolution) -> Option<SolvedAssignment> {
        if !solution.is_solution_found() {
            return None;
        }
        let mut grid = SolvedAssignment::new(self.num_instructors, self.num_days, self.num_groups);
        for i in 0..self.num_instructors {
            for d in 0..self.num_days {
                for g in 0..self.num_groups {
                    if solution.value(self.var(i, d, g)) {
                        grid.assign(i, d, g);
                    }
                }
            }
        }
        Some(grid)
    }
}

/// Builds the hard-constraint model.
///
/// # Example
/// ```
/// use std::collections::HashSet;
/// use chrono::NaiveDate;
/// use u_timetable::assignment::{AssignmentModelBuilder, WorkloadLimits};
/// use u_timetable::models::WorkingCalendar;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let calendar = WorkingCalendar::new(start, 7, &HashSet::new());
/// let model = AssignmentModelBuilder::new(&calendar, 2, 1)
///     .with_limits(WorkloadLimits::default())
///     .build()
///     .unwrap();
/// assert_eq!(model.model().var_count(), 2 * 7 * 1 + 2 * 5);
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentModelBuilder<'a> {
    calendar: &'a WorkingCalendar,
    num_instructors: usize,
    num_groups: usize,
    limits: WorkloadLimits,
}

impl<'a> AssignmentModelBuilder<'a> {
    pub fn new(calendar: &'a WorkingCalendar, num_instructors: usize, num_groups: usize) -> Self {
        Self {
            calendar,
            num_instructors,
            num_groups,
            limits: WorkloadLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: WorkloadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds the model.
    ///
    /// # Errors
    /// Rejects empty instructor or group lists and horizons without a
    /// working day.
    pub fn build(self) -> Result<AssignmentModel, ConfigurationError> {
        let ni = self.num_instructors;
        let ng = self.num_groups;
        let nd = self.calendar.num_days();
        if ni == 0 {
            return Err(ConfigurationError::NoInstructors);
        }
        if ng == 0 {
            return Err(ConfigurationError::NoGroups);
        }
        if self.calendar.working_day_count() == 0 {
            return Err(ConfigurationError::NoWorkingDays {
                num_days: nd,
                non_working: self.calendar.non_working_days().len(),
            });
        }

        let mut model = CpModel::new("timetable");
        let mut cells = Vec::with_capacity(ni * nd * ng);
        for i in 0..ni {
            for d in 0..nd {
                for g in 0..ng {
                    cells.push(model.new_bool_var(format!("x[{i},{d},{g}]")));
                }
            }
        }
        let x = |i: usize, d: usize, g: usize| cells[(i * nd + d) * ng + g];

        for &d in self.calendar.non_working_days() {
            let day_cells = (0..ni).flat_map(|i| (0..ng).map(move |g| (i, g)));
            model.add_equality(LinearExpr::sum(day_cells.map(|(i, g)| x(i, d, g))), 0);
        }

        let working: Vec<usize> = self.calendar.working_days().collect();
        for &d in &working {
            for g in 0..ng {
                model.add_exactly_one((0..ni).map(|i| x(i, d, g)));
            }
        }
        for i in 0..ni {
            for &d in &working {
                model.add_at_most_one((0..ng).map(|g| x(i, d, g)));
            }
        }

        let mut worked = vec![None; ni * nd];
        for i in 0..ni {
            for &d in &working {
                let w = model.new_bool_var(format!("w[{i},{d}]"));
                let day_sum = LinearExpr::sum((0..ng).map(|g| x(i, d, g))).with_term(w, -1);
                model.add_equality(day_sum, 0);
                worked[i * nd + d] = Some(w);
            }
        }

        let session_cap = self.limits.max_sessions_per_week() as i64;
        let day_cap = i64::from(self.limits.max_working_days_per_week);
        let mut windows = 0usize;
        for week in self.calendar.weeks() {
            let week_working: Vec<usize> = week.filter(|&d| self.calendar.is_working(d)).collect();
            if week_working.is_empty() {
                continue;
            }
            windows += 1;
            for i in 0..ni {
                let sessions = week_working
                    .iter()
                    .flat_map(|&d| (0..ng).map(move |g| (d, g)))
                    .map(|(d, g)| x(i, d, g));
                model.add_less_or_equal(LinearExpr::sum(sessions), session_cap);

                let days_worked = week_working.iter().filter_map(|&d| worked[i * nd + d]);
                model.add_less_or_equal(LinearExpr::sum(days_worked), day_cap);
            }
        }

        debug!(
            event = "model_built",
            instructors = ni,
            days = nd,
            groups = ng,
            working_days = working.len(),
            windows,
            session_cap,
            day_cap,
            vars = model.var_count(),
            constraints = model.constraint_count(),
        );

        Ok(AssignmentModel {
            model,
            cells,
            worked,
            num_instructors: ni,
            num_days: nd,
            num_groups: ng,
        })
    }
}
