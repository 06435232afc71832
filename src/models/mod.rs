//! Timetabling domain models.
//!
//! Provides the data types for instructor-to-group timetabling: the
//! entities being scheduled, the curriculum they follow, the working-day
//! calendar, and the solved timetable.
//!
//! # Domain Mappings
//!
//! | u-timetable | Training center | School | Clinic |
//! |-------------|-----------------|--------|--------|
//! | Instructor | Trainer | Teacher | Physician |
//! | Group | Cohort | Class | Ward |
//! | Environment | Workshop/Lab | Classroom | Consulting room |
//! | CurriculumSession | Learning outcome | Lesson | Procedure |

mod calendar;
mod curriculum;
mod entities;
mod schedule;

use chrono::NaiveTime;

pub use calendar::{
    collect_holidays, is_weekend, non_working_days, week_windows, weekday_name, FixedHolidays,
    HolidayError, HolidaySource, WorkingCalendar, WEEK_LENGTH,
};
pub use curriculum::{
    derive_hours_per_session, CurriculumIndex, CurriculumSession, TrimesterKey,
    DEFAULT_HOURS_PER_SESSION, PLACEHOLDER_SUBJECT,
};
pub use entities::{Environment, Group, Instructor};
pub use schedule::{
    ScheduleRow, SolvedAssignment, TimeSlot, Timetable, Violation, ViolationType,
    STATUS_SCHEDULED,
};

/// Text used when a descriptive field is missing.
pub const NOT_AVAILABLE: &str = "N/A";

pub(crate) fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Wall-clock time `h:m`; out-of-range input yields midnight.
pub(crate) fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
