//! Timetable load metrics (KPIs).
//!
//! Summarizes a materialized timetable per instructor and along the
//! weekday, environment, and subject axes.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Load | Sessions taught by an instructor |
//! | Spread | max(load) − min(load) |
//! | Mean load | total sessions / instructors |
//! | Distinct environments | Rooms an instructor used |
//! | Usage by weekday / environment / subject | Row counts per key |

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;

use crate::models::{Instructor, ScheduleRow};

/// Programs listed per instructor in the report.
pub const MAX_PROGRAMS_LISTED: usize = 3;

const WEEKDAYS: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

/// Per-instructor summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructorLoad {
    /// Instructor name.
    pub instructor: String,
    /// Sessions taught.
    pub sessions: usize,
    /// Distinct environments used.
    pub distinct_environments: usize,
    /// First programs taught, in row order, at most [`MAX_PROGRAMS_LISTED`].
    pub programs: Vec<String>,
}

/// Timetable performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct TimetableKpi {
    /// Total rows.
    pub total_sessions: usize,
    /// One entry per input instructor, in input order.
    pub instructor_loads: Vec<InstructorLoad>,
    /// Sessions per weekday, Monday first.
    pub sessions_by_weekday: Vec<(String, usize)>,
    /// Sessions per environment.
    pub sessions_by_environment: BTreeMap<String, usize>,
    /// Sessions per subject.
    pub sessions_by_subject: BTreeMap<String, usize>,
    /// Smallest instructor load.
    pub min_load: usize,
    /// Largest instructor load.
    pub max_load: usize,
    /// Mean instructor load.
    pub mean_load: f64,
}

impl TimetableKpi {
    /// Computes KPIs from timetable rows and the input instructors.
    ///
    /// Instructors without rows are reported with zero load. Rows naming
    /// an unknown instructor still count toward the axis totals.
    pub fn calculate(rows: &[ScheduleRow], instructors: &[Instructor]) -> Self {
        let mut instructor_loads: Vec<InstructorLoad> = instructors
            .iter()
            .map(|inst| InstructorLoad {
                instructor: inst.name.clone(),
                sessions: 0,
                distinct_environments: 0,
                programs: Vec::new(),
            })
            .collect();
        let mut environments: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); instructors.len()];

        let mut by_weekday = [0usize; 7];
        let mut sessions_by_environment = BTreeMap::new();
        let mut sessions_by_subject = BTreeMap::new();

        for row in rows {
            by_weekday[row.date.weekday().num_days_from_monday() as usize] += 1;
            *sessions_by_environment
                .entry(row.environment.clone())
                .or_insert(0) += 1;
            *sessions_by_subject.entry(row.subject.clone()).or_insert(0) += 1;

            let Some(idx) = instructor_index(row, instructors) else {
                continue;
            };
            let load = &mut instructor_loads[idx];
            load.sessions += 1;
            environments[idx].insert(row.environment.as_str());
            if load.programs.len() < MAX_PROGRAMS_LISTED && !load.programs.contains(&row.program) {
                load.programs.push(row.program.clone());
            }
        }
        for (load, envs) in instructor_loads.iter_mut().zip(&environments) {
            load.distinct_environments = envs.len();
        }

        let min_load = instructor_loads.iter().map(|l| l.sessions).min().unwrap_or(0);
        let max_load = instructor_loads.iter().map(|l| l.sessions).max().unwrap_or(0);
        let mean_load = if instructor_loads.is_empty() {
            0.0
        } else {
            let total: usize = instructor_loads.iter().map(|l| l.sessions).sum();
            total as f64 / instructor_loads.len() as f64
        };

        Self {
            total_sessions: rows.len(),
            instructor_loads,
            sessions_by_weekday: WEEKDAYS
                .iter()
                .zip(by_weekday)
                .map(|(name, n)| (name.to_string(), n))
                .collect(),
            sessions_by_environment,
            sessions_by_subject,
            min_load,
            max_load,
            mean_load,
        }
    }

    /// `max_load − min_load`.
    pub fn spread(&self) -> usize {
        self.max_load - self.min_load
    }

    /// Load entry for an instructor.
    pub fn load_of(&self, instructor: &str) -> Option<&InstructorLoad> {
        self.instructor_loads
            .iter()
            .find(|l| l.instructor == instructor)
    }

    /// Whether the load spread stays within `max_spread`.
    pub fn meets_spread(&self, max_spread: usize) -> bool {
        self.spread() <= max_spread
    }
}

/// Row's instructor position: the recorded index when it matches by name,
/// otherwise the first instructor with that name.
fn instructor_index(row: &ScheduleRow, instructors: &[Instructor]) -> Option<usize> {
    match instructors.get(row.instructor_index) {
        Some(inst) if inst.name == row.instructor => Some(row.instructor_index),
        _ => instructors.iter().position(|i| i.name == row.instructor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::ScheduleMaterializer;
    use crate::models::{
        CurriculumIndex, CurriculumSession, Environment, Group, SolvedAssignment,
        WorkingCalendar,
    };
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn sample_rows(instructors: &[Instructor]) -> Vec<ScheduleRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let calendar = WorkingCalendar::new(start, 7, &HashSet::new());
        let groups = vec![
            Group::new("G1").with_program("Agro"),
            Group::new("G2").with_program("Zoo"),
        ];
        let environments = vec![Environment::new("E1"), Environment::new("E2")];
        let curriculum = CurriculumIndex::new(vec![
            CurriculumSession::new("Suelos"),
            CurriculumSession::new("Riego"),
        ]);
        // Ana takes G1 every working day, Luis takes G2 on Monday and Tuesday.
        let mut grid = SolvedAssignment::new(3, 7, 2);
        for d in calendar.working_days() {
            grid.assign(0, d, 0);
        }
        grid.assign(1, 0, 1);
        grid.assign(1, 1, 1);
        ScheduleMaterializer::new(&calendar, instructors, &groups, &environments, &curriculum)
            .materialize(&grid)
    }

    fn sample_instructors() -> Vec<Instructor> {
        vec![
            Instructor::new("Ana"),
            Instructor::new("Luis"),
            Instructor::new("Eva"),
        ]
    }

    #[test]
    fn test_kpi_loads() {
        let instructors = sample_instructors();
        let kpi = TimetableKpi::calculate(&sample_rows(&instructors), &instructors);
        assert_eq!(kpi.total_sessions, 7);
        assert_eq!(kpi.load_of("Ana").unwrap().sessions, 5);
        assert_eq!(kpi.load_of("Luis").unwrap().sessions, 2);
        assert_eq!(kpi.load_of("Eva").unwrap().sessions, 0);
        assert_eq!((kpi.min_load, kpi.max_load), (0, 5));
        assert_eq!(kpi.spread(), 5);
        assert!((kpi.mean_load - 7.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_environments_and_programs() {
        let instructors = sample_instructors();
        let kpi = TimetableKpi::calculate(&sample_rows(&instructors), &instructors);
        // Ana on G1: keys 0, 2, 4, 6, 8 are all even, so always E1.
        let ana = kpi.load_of("Ana").unwrap();
        assert_eq!(ana.distinct_environments, 1);
        assert_eq!(ana.programs, vec!["Agro"]);
        let luis = kpi.load_of("Luis").unwrap();
        assert_eq!(luis.programs, vec!["Zoo"]);
    }

    #[test]
    fn test_kpi_axes() {
        let instructors = sample_instructors();
        let kpi = TimetableKpi::calculate(&sample_rows(&instructors), &instructors);
        assert_eq!(kpi.sessions_by_weekday[0], ("Lunes".to_string(), 2));
        assert_eq!(kpi.sessions_by_weekday[4], ("Viernes".to_string(), 1));
        assert_eq!(kpi.sessions_by_weekday[5].1, 0);
        assert_eq!(kpi.sessions_by_environment.get("E1"), Some(&5));
        assert_eq!(kpi.sessions_by_environment.get("E2"), Some(&2));
        let subjects: usize = kpi.sessions_by_subject.values().sum();
        assert_eq!(subjects, 7);
    }

    #[test]
    fn test_kpi_program_list_capped() {
        let instructors = vec![Instructor::new("Ana")];
        let mut rows = sample_rows(&sample_instructors());
        rows.retain(|r| r.instructor == "Ana");
        for (k, row) in rows.iter_mut().enumerate() {
            row.program = format!("P{k}");
            row.instructor_index = 0;
        }
        let kpi = TimetableKpi::calculate(&rows, &instructors);
        assert_eq!(kpi.load_of("Ana").unwrap().programs, vec!["P0", "P1", "P2"]);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = TimetableKpi::calculate(&[], &[]);
        assert_eq!(kpi.total_sessions, 0);
        assert_eq!(kpi.spread(), 0);
        assert_eq!(kpi.mean_load, 0.0);
        assert!(kpi.meets_spread(0));
    }
}
