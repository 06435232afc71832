//! Working-day calendar.
//!
//! Classifies each day index of a planning horizon as working or
//! non-working. Weekends (Saturday, Sunday) are always non-working;
//! holidays come from an external [`HolidaySource`].
//!
//! # Day Model
//! Day `d` is `start_date + d` days, for `d` in `0..num_days`.
//! Weekly limits apply to consecutive 7-day windows counted from
//! day 0 (the last window may be shorter), not to calendar weeks.

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use thiserror::Error;
use tracing::warn;

/// Length of a workload window in days.
pub const WEEK_LENGTH: usize = 7;

/// Failure to obtain holidays for a year.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HolidayError {
    #[error("holidays for {year} unavailable: {reason}")]
    Unavailable { year: i32, reason: String },
}

/// Supplier of public holidays, queried once per calendar year.
pub trait HolidaySource {
    /// Holidays falling in `year`.
    fn holidays(&self, year: i32) -> Result<Vec<NaiveDate>, HolidayError>;
}

/// In-memory holiday list.
#[derive(Debug, Clone, Default)]
pub struct FixedHolidays {
    dates: BTreeSet<NaiveDate>,
}

impl FixedHolidays {
    /// Creates a source from a list of dates.
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidaySource for FixedHolidays {
    fn holidays(&self, year: i32) -> Result<Vec<NaiveDate>, HolidayError> {
        Ok(self
            .dates
            .iter()
            .filter(|d| d.year() == year)
            .copied()
            .collect())
    }
}

/// Collects holidays for every year the horizon touches.
///
/// Years run from `start_date`'s year through the year of
/// `start_date + num_days`. A failing year is logged and skipped, so a
/// broken source degrades to fewer holidays instead of aborting.
pub fn collect_holidays<S: HolidaySource + ?Sized>(
    source: &S,
    start_date: NaiveDate,
    num_days: usize,
) -> HashSet<NaiveDate> {
    let end_year = add_days(start_date, num_days).year();
    let mut holidays = HashSet::new();
    for year in start_date.year()..=end_year {
        match source.holidays(year) {
            Ok(dates) => holidays.extend(dates),
            Err(err) => warn!(event = "holidays_unavailable", year, error = %err, "continuing without them"),
        }
    }
    holidays
}

/// Whether a date falls on Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Spanish weekday name of a date.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// Day indices in `0..num_days` falling on a weekend or a holiday.
pub fn non_working_days(
    start_date: NaiveDate,
    num_days: usize,
    holidays: &HashSet<NaiveDate>,
) -> BTreeSet<usize> {
    (0..num_days)
        .filter(|&d| {
            let date = add_days(start_date, d);
            is_weekend(date) || holidays.contains(&date)
        })
        .collect()
}

/// Consecutive 7-day windows covering `0..num_days`.
pub fn week_windows(num_days: usize) -> Vec<Range<usize>> {
    (0..num_days)
        .step_by(WEEK_LENGTH)
        .map(|start| start..(start + WEEK_LENGTH).min(num_days))
        .collect()
}

fn add_days(date: NaiveDate, days: usize) -> NaiveDate {
    date.checked_add_days(Days::new(days as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// A planning horizon with its working/non-working classification.
///
/// # Example
/// ```
/// use std::collections::HashSet;
/// use chrono::NaiveDate;
/// use u_timetable::models::WorkingCalendar;
///
/// // Monday 2024-03-04, one week, no holidays.
/// let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let cal = WorkingCalendar::new(start, 7, &HashSet::new());
/// assert_eq!(cal.working_day_count(), 5);
/// assert!(!cal.is_working(5)); // Saturday
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCalendar {
    start_date: NaiveDate,
    num_days: usize,
    non_working: BTreeSet<usize>,
}

impl WorkingCalendar {
    /// Classifies `num_days` days from `start_date` against weekends and `holidays`.
    pub fn new(start_date: NaiveDate, num_days: usize, holidays: &HashSet<NaiveDate>) -> Self {
        Self {
            start_date,
            num_days,
            non_working: non_working_days(start_date, num_days, holidays),
        }
    }

    /// Uses an explicit non-working set; indices outside the horizon are dropped.
    pub fn from_non_working(
        start_date: NaiveDate,
        num_days: usize,
        non_working: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            start_date,
            num_days,
            non_working: non_working.into_iter().filter(|&d| d < num_days).collect(),
        }
    }

    /// First day of the horizon.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Horizon length in days.
    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// Calendar date of day `day`.
    pub fn date_of(&self, day: usize) -> NaiveDate {
        add_days(self.start_date, day)
    }

    /// Spanish weekday name of day `day`.
    pub fn weekday_name(&self, day: usize) -> &'static str {
        weekday_name(self.date_of(day))
    }

    /// Whether `day` is inside the horizon and neither weekend nor holiday.
    pub fn is_working(&self, day: usize) -> bool {
        day < self.num_days && !self.non_working.contains(&day)
    }

    /// Non-working day indices.
    pub fn non_working_days(&self) -> &BTreeSet<usize> {
        &self.non_working
    }

    /// Working day indices in ascending order.
    pub fn working_days(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_days).filter(move |&d| self.is_working(d))
    }

    /// Number of working days.
    pub fn working_day_count(&self) -> usize {
        self.num_days - self.non_working.len()
    }

    /// Consecutive 7-day windows over the horizon.
    pub fn weeks(&self) -> Vec<Range<usize>> {
        week_windows(self.num_days)
    }
}
