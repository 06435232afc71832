//! Timetable (solution) model.
//!
//! A solved assignment is the raw 0/1 decision grid over
//! (instructor, day, group). A timetable is that grid materialized into
//! human-readable rows, plus any rule violations found by auditing it.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::clock;
use super::curriculum::TrimesterKey;

/// Status text written on every scheduled row.
pub const STATUS_SCHEDULED: &str = "Programado";

/// Daily time slot, chosen by rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeSlot {
    /// 08:00-13:00.
    Morning,
    /// 14:00-18:00.
    Afternoon,
    /// 18:00-22:00.
    Evening,
}

impl TimeSlot {
    /// All slots in rotation order.
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    /// Slot for rotation key `key` (`Morning`, `Afternoon`, `Evening` repeating).
    pub fn from_rotation(key: usize) -> Self {
        Self::ALL[key % Self::ALL.len()]
    }

    pub fn start(self) -> NaiveTime {
        match self {
            TimeSlot::Morning => clock(8, 0),
            TimeSlot::Afternoon => clock(14, 0),
            TimeSlot::Evening => clock(18, 0),
        }
    }

    pub fn end(self) -> NaiveTime {
        match self {
            TimeSlot::Morning => clock(13, 0),
            TimeSlot::Afternoon => clock(18, 0),
            TimeSlot::Evening => clock(22, 0),
        }
    }

    /// Spanish shift label.
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "Mañana",
            TimeSlot::Afternoon => "Tarde",
            TimeSlot::Evening => "Noche",
        }
    }
}

/// One scheduled (instructor, day, group) cell with its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Calendar date.
    pub date: NaiveDate,
    /// Spanish weekday name.
    pub weekday: String,
    /// Rotated daily slot.
    pub slot: TimeSlot,
    /// Slot start.
    pub start_time: NaiveTime,
    /// Slot end.
    pub end_time: NaiveTime,
    /// Group identifier.
    pub group_id: String,
    pub program: String,
    pub trimester: TrimesterKey,
    pub group_location: String,
    /// Curriculum subject.
    pub subject: String,
    pub competency: String,
    pub learning_outcome: String,
    /// Nominal curriculum start time.
    pub session_start: NaiveTime,
    /// Nominal curriculum end time.
    pub session_end: NaiveTime,
    /// Instructor name.
    pub instructor: String,
    pub instructor_shift: String,
    pub instructor_exclusions: String,
    /// Rotated environment.
    pub environment: String,
    /// Always [`STATUS_SCHEDULED`].
    pub status: String,
    /// Free-form notes; empty on generation.
    pub notes: String,
    /// Set when the date is a weekend or holiday.
    pub non_working_day: bool,
    /// Day index in the horizon.
    pub day_index: usize,
    /// Group position in the input.
    pub group_index: usize,
    /// Instructor position in the input.
    pub instructor_index: usize,
}

/// Raw solver decision grid.
///
/// Cell `(i, d, g)` is set when instructor `i` teaches group `g` on day `d`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedAssignment {
    num_instructors: usize,
    num_days: usize,
    num_groups: usize,
    cells: Vec<bool>,
}

impl SolvedAssignment {
    /// Creates an empty grid.
    pub fn new(num_instructors: usize, num_days: usize, num_groups: usize) -> Self {
        Self {
            num_instructors,
            num_days,
            num_groups,
            cells: vec![false; num_instructors * num_days * num_groups],
        }
    }

    fn offset(&self, instructor: usize, day: usize, group: usize) -> Option<usize> {
        (instructor < self.num_instructors && day < self.num_days && group < self.num_groups)
            .then(|| (instructor * self.num_days + day) * self.num_groups + group)
    }

    /// Sets cell `(i, d, g)`. Out-of-range cells are ignored.
    pub fn assign(&mut self, instructor: usize, day: usize, group: usize) {
        if let Some(k) = self.offset(instructor, day, group) {
            self.cells[k] = true;
        }
    }

    pub fn is_assigned(&self, instructor: usize, day: usize, group: usize) -> bool {
        self.offset(instructor, day, group)
            .is_some_and(|k| self.cells[k])
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

    /// Instructors covering group `g` on day `d`.
    pub fn instructors_for(&self, day: usize, group: usize) -> Vec<usize> {
        (0..self.num_instructors)
            .filter(|&i| self.is_assigned(i, day, group))
            .collect()
    }

    /// Sessions taught by instructor `i` on day `d`.
    pub fn sessions_on(&self, instructor: usize, day: usize) -> usize {
        (0..self.num_groups)
            .filter(|&g| self.is_assigned(instructor, day, g))
            .count()
    }

    /// Total sessions taught by instructor `i`.
    pub fn load(&self, instructor: usize) -> usize {
        (0..self.num_days)
            .map(|d| self.sessions_on(instructor, d))
            .sum()
    }

    /// Load of every instructor, in input order.
    pub fn loads(&self) -> Vec<usize> {
        (0..self.num_instructors).map(|i| self.load(i)).collect()
    }

    /// `max(load) - min(load)`, 0 without instructors.
    pub fn spread(&self) -> usize {
        let loads = self.loads();
        match (loads.iter().max(), loads.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        }
    }

    /// Set cells as `(i, d, g)`, ordered by day, then group, then instructor.
    pub fn assignments(&self) -> Vec<(usize, usize, usize)> {
        let mut out = Vec::new();
        for d in 0..self.num_days {
            for g in 0..self.num_groups {
                for i in 0..self.num_instructors {
                    if self.is_assigned(i, d, g) {
                        out.push((i, d, g));
                    }
                }
            }
        }
        out
    }

    /// Number of set cells.
    pub fn assignment_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// A materialized timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// Rows sorted by (date, slot start, program).
    pub rows: Vec<ScheduleRow>,
    /// Rule violations detected by auditing the assignment.
    pub violations: Vec<Violation>,
}

impl Timetable {
    pub fn new(rows: Vec<ScheduleRow>) -> Self {
        Self {
            rows,
            violations: Vec::new(),
        }
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether the timetable has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Rows taught by an instructor.
    pub fn rows_for_instructor(&self, instructor: &str) -> Vec<&ScheduleRow> {
        self.rows.iter().filter(|r| r.instructor == instructor).collect()
    }

    /// Rows for a group.
    pub fn rows_for_group(&self, group_id: &str) -> Vec<&ScheduleRow> {
        self.rows.iter().filter(|r| r.group_id == group_id).collect()
    }

    /// Rows on a date.
    pub fn rows_on(&self, date: NaiveDate) -> Vec<&ScheduleRow> {
        self.rows.iter().filter(|r| r.date == date).collect()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A rule violation found in a solved assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (instructor, group, or cell).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// A working (day, group) cell without exactly one instructor.
    CoverageGap,
    /// An instructor teaching more than one group on a day.
    DoubleBooking,
    /// A session on a weekend or holiday.
    NonWorkingDayAssignment,
    /// More sessions in a 7-day window than the weekly hours allow.
    WeeklySessionCap,
    /// More working days taught in a 7-day window than allowed.
    WeeklyWorkingDayCap,
    /// An instructor load outside the equity band.
    EquityBand,
}

impl Violation {
    fn new(violation_type: ViolationType, entity_id: String, message: String, severity: i32) -> Self {
        Self {
            violation_type,
            entity_id,
            message,
            severity,
        }
    }

    /// Working cell `(d, g)` covered by `count` instructors instead of one.
    pub fn coverage_gap(day: usize, group: usize, count: usize) -> Self {
        Self::new(
            ViolationType::CoverageGap,
            format!("day {day}/group {group}"),
            format!("covered by {count} instructors, expected 1"),
            100,
        )
    }

    /// Instructor teaching `count` groups on day `d`.
    pub fn double_booking(instructor: usize, day: usize, count: usize) -> Self {
        Self::new(
            ViolationType::DoubleBooking,
            format!("instructor {instructor}"),
            format!("{count} groups on day {day}"),
            95,
        )
    }

    /// Session on a non-working day.
    pub fn non_working_day(instructor: usize, day: usize, group: usize) -> Self {
        Self::new(
            ViolationType::NonWorkingDayAssignment,
            format!("instructor {instructor}"),
            format!("group {group} on non-working day {day}"),
            90,
        )
    }

    /// Weekly session count above the cap.
    pub fn weekly_sessions(instructor: usize, week_start: usize, sessions: usize, cap: usize) -> Self {
        Self::new(
            ViolationType::WeeklySessionCap,
            format!("instructor {instructor}"),
            format!("{sessions} sessions in week from day {week_start}, cap {cap}"),
            80,
        )
    }

    /// Weekly worked-day count above the cap.
    pub fn weekly_days(instructor: usize, week_start: usize, days: usize, cap: usize) -> Self {
        Self::new(
            ViolationType::WeeklyWorkingDayCap,
            format!("instructor {instructor}"),
            format!("{days} days worked in week from day {week_start}, cap {cap}"),
            80,
        )
    }

    /// Load outside `[lower, upper]`.
    pub fn equity_band(instructor: usize, load: usize, lower: usize, upper: usize) -> Self {
        Self::new(
            ViolationType::EquityBand,
            format!("instructor {instructor}"),
            format!("load {load} outside [{lower}, {upper}]"),
            60,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_rotation() {
        assert_eq!(TimeSlot::from_rotation(0), TimeSlot::Morning);
        assert_eq!(TimeSlot::from_rotation(1), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_rotation(2), TimeSlot::Evening);
        assert_eq!(TimeSlot::from_rotation(5), TimeSlot::Evening);
        assert_eq!(TimeSlot::Afternoon.start(), clock(14, 0));
        assert_eq!(TimeSlot::Evening.end(), clock(22, 0));
        assert_eq!(TimeSlot::Morning.label(), "Mañana");
    }

    #[test]
    fn test_assignment_grid() {
        let mut a = SolvedAssignment::new(2, 3, 2);
        a.assign(0, 0, 0);
        a.assign(1, 0, 1);
        a.assign(0, 2, 1);
        a.assign(5, 0, 0); // out of range, ignored

        assert!(a.is_assigned(0, 0, 0));
        assert!(!a.is_assigned(1, 0, 0));
        assert!(!a.is_assigned(9, 9, 9));
        assert_eq!(a.instructors_for(0, 1), vec![1]);
        assert_eq!(a.loads(), vec![2, 1]);
        assert_eq!(a.spread(), 1);
        assert_eq!(a.assignment_count(), 3);
        assert_eq!(a.assignments(), vec![(0, 0, 0), (1, 0, 1), (0, 2, 1)]);
    }

    #[test]
    fn test_empty_spread() {
        assert_eq!(SolvedAssignment::new(0, 5, 2).spread(), 0);
    }

    #[test]
    fn test_violation_factories() {
        let v = Violation::coverage_gap(3, 1, 0);
        assert_eq!(v.violation_type, ViolationType::CoverageGap);
        assert_eq!(v.entity_id, "day 3/group 1");

        let v = Violation::weekly_sessions(2, 7, 6, 5);
        assert_eq!(v.violation_type, ViolationType::WeeklySessionCap);
        assert!(v.message.contains("cap 5"));
    }

    #[test]
    fn test_timetable_validity() {
        let mut t = Timetable::new(Vec::new());
        assert!(t.is_valid());
        t.add_violation(Violation::double_booking(0, 1, 2));
        assert!(!t.is_valid());
        assert_eq!(t.row_count(), 0);
    }
}
