//! Workload fairness.
//!
//! The total demand is fixed: every working (day, group) cell needs one
//! instructor, so `total = groups × working_days`. Splitting it evenly
//! gives each instructor `floor(total / n)` or `ceil(total / n)`
//! sessions. The controller always minimizes the spread
//! `max(load) − min(load)` and, when equity is forced, also confines
//! every load to a band around the even split.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::builder::AssignmentModel;

/// Target loads and tolerance for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityBand {
    /// Sessions to cover: groups × working days.
    pub total_required: usize,
    /// `floor(total / n)`.
    pub target_low: usize,
    /// `ceil(total / n)`.
    pub target_high: usize,
    /// Tolerance around the targets: `max(1, target_low / 10)`.
    pub margin: usize,
}

impl EquityBand {
    /// Targets for `num_instructors` sharing `num_groups × working_days` sessions.
    ///
    /// With zero instructors every target is 0.
    pub fn compute(num_groups: usize, working_days: usize, num_instructors: usize) -> Self {
        let total_required = num_groups * working_days;
        let (target_low, target_high) = match num_instructors {
            0 => (0, 0),
            n => {
                let low = total_required / n;
                (low, low + usize::from(total_required % n != 0))
            }
        };
        Self {
            total_required,
            target_low,
            target_high,
            margin: (target_low / 10).max(1),
        }
    }

    /// Smallest allowed load, clamped at 0.
    pub fn lower(&self) -> usize {
        self.target_low.saturating_sub(self.margin)
    }

    /// Largest allowed load.
    pub fn upper(&self) -> usize {
        self.target_high + self.margin
    }

    pub fn contains(&self, load: usize) -> bool {
        (self.lower()..=self.upper()).contains(&load)
    }

    /// Spread no solution can beat: 1 when the split is uneven, else 0.
    pub fn spread_lower_bound(&self) -> usize {
        self.target_high - self.target_low
    }
}

/// Adds the fairness rules and objective to an assignment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FairnessController {
    force_equity: bool,
}

impl Default for FairnessController {
    fn default() -> Self {
        Self { force_equity: true }
    }
}

impl FairnessController {
    pub fn new(force_equity: bool) -> Self {
        Self { force_equity }
    }

    pub fn force_equity(&self) -> bool {
        self.force_equity
    }

    /// Installs the band (if forced) and the spread objective.
    pub fn apply(&self, assignment: &mut AssignmentModel, working_days: usize) -> EquityBand {
        let n = assignment.num_instructors();
        let band = EquityBand::compute(assignment.num_groups(), working_days, n);
        let loads: Vec<_> = (0..n).map(|i| assignment.load_expr(i)).collect();

        let model = assignment.model_mut();
        if self.force_equity {
            for load in &loads {
                model.add_linear(load.clone(), band.lower() as i64, band.upper() as i64);
            }
        }
        model.minimize_spread(loads, band.spread_lower_bound() as i64);

        debug!(
            event = "fairness_applied",
            force_equity = self.force_equity,
            total_required = band.total_required,
            target_low = band.target_low,
            target_high = band.target_high,
            margin = band.margin,
            lower = band.lower(),
            upper = band.upper(),
        );
        band
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentModelBuilder;
    use crate::cp::{CpSolver, HighsSolver, Objective, SolveStatus, SolverConfig};
    use crate::models::WorkingCalendar;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn calendar(num_days: usize) -> WorkingCalendar {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        WorkingCalendar::new(start, num_days, &HashSet::new())
    }

    #[test]
    fn test_band_even_split() {
        // 2 groups x 5 days over 2 instructors.
        let band = EquityBand::compute(2, 5, 2);
        assert_eq!(band.total_required, 10);
        assert_eq!((band.target_low, band.target_high), (5, 5));
        assert_eq!(band.margin, 1);
        assert_eq!((band.lower(), band.upper()), (4, 6));
        assert_eq!(band.spread_lower_bound(), 0);
    }

    #[test]
    fn test_band_uneven_split() {
        // 3 groups x 10 days over 4 instructors.
        let band = EquityBand::compute(3, 10, 4);
        assert_eq!((band.target_low, band.target_high), (7, 8));
        assert_eq!((band.lower(), band.upper()), (6, 9));
        assert!(band.contains(6) && band.contains(9));
        assert!(!band.contains(5) && !band.contains(10));
        assert_eq!(band.spread_lower_bound(), 1);
    }

    #[test]
    fn test_band_large_margin() {
        let band = EquityBand::compute(10, 50, 4);
        assert_eq!(band.target_low, 125);
        assert_eq!(band.margin, 12);
        assert_eq!((band.lower(), band.upper()), (113, 137));
    }

    #[test]
    fn test_band_small_targets() {
        // Fewer sessions than instructors: low is 0, margin 1, lower clamps to 0.
        let band = EquityBand::compute(1, 2, 5);
        assert_eq!((band.target_low, band.target_high), (0, 1));
        assert_eq!(band.margin, 1);
        assert_eq!((band.lower(), band.upper()), (0, 2));
    }

    #[test]
    fn test_objective_installed_without_equity() {
        let cal = calendar(7);
        let mut built = AssignmentModelBuilder::new(&cal, 2, 1).build().unwrap();
        let before = built.model().constraint_count();
        FairnessController::new(false).apply(&mut built, cal.working_day_count());
        assert_eq!(built.model().constraint_count(), before);
        assert!(matches!(
            built.model().objective(),
            Objective::MinimizeSpread { lower_bound: 1, .. }
        ));
    }

    #[test]
    fn test_forced_band_holds_in_solution() {
        // 4 instructors, 3 groups, 10 working days: band [6, 9].
        let cal = calendar(14);
        let mut built = AssignmentModelBuilder::new(&cal, 4, 3).build().unwrap();
        let band = FairnessController::new(true).apply(&mut built, cal.working_day_count());
        let config = SolverConfig::new().with_time_limit_secs(20.0);
        let solution = HighsSolver::new().solve(built.model(), &config);
        assert!(solution.status.has_solution());
        let grid = built.extract(&solution).unwrap();
        for i in 0..4 {
            assert!(band.contains(grid.load(i)), "load {}", grid.load(i));
        }
        if solution.status == SolveStatus::Optimal {
            assert_eq!(grid.spread(), 1);
        }
    }
}
