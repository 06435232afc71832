//! Instructor timetabling for the U-Engine ecosystem.
//!
//! Assigns instructors to groups over a multi-week horizon so that every
//! group has exactly one instructor on every working day, within weekly
//! workload limits and an optional equity band, then expands the solved
//! assignment into dated, timed, resourced timetable rows.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Instructor`, `Group`, `Environment`,
//!   `CurriculumSession`, `WorkingCalendar`, `ScheduleRow`, `SolvedAssignment`
//! - **`cp`**: 0-1 constraint model and its HiGHS-backed solver
//! - **`assignment`**: Hard-constraint model builder and fairness controller
//! - **`materialize`**: Deterministic rotation of environments, sessions, slots
//! - **`validation`**: Input checks and post-solve invariant audit
//! - **`kpi`**: Load and usage metrics over timetable rows
//! - **`config`**: TOML-loadable engine and solver parameters
//! - **`engine`**: The calendar → model → solve → materialize pipeline
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use u_timetable::{EngineConfig, SolverConfig, TimetableEngine, TimetableInput};
//! use u_timetable::models::{Environment, Group, Instructor};
//!
//! let config = EngineConfig::new()
//!     .with_start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
//!     .with_num_days(14)
//!     .with_solver(SolverConfig::new().with_time_limit_secs(10.0));
//! let input = TimetableInput::new(
//!     vec![Instructor::new("Ana"), Instructor::new("Luis"), Instructor::new("Eva")],
//!     vec![Group::new("2758193").with_program("ADSO")],
//!     vec![Environment::new("Ambiente 101")],
//! );
//!
//! let outcome = TimetableEngine::new(config).run(&input).unwrap();
//! assert!(outcome.status.has_solution());
//! assert_eq!(outcome.timetable.row_count(), 10);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod assignment;
pub mod config;
pub mod cp;
pub mod engine;
pub mod error;
pub mod kpi;
pub mod materialize;
pub mod models;
pub mod validation;

pub use config::{ConfigError, EngineConfig};
pub use cp::{SolveStatus, SolverConfig};
pub use engine::{EngineOutcome, SolveDiagnostics, TimetableEngine, TimetableInput};
pub use error::ConfigurationError;
