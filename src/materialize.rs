//! Timetable materialization.
//!
//! Turns a solved decision grid into rows. Everything beyond the
//! instructor choice is a deterministic rotation over the cell key
//! `k = d × groups + g`:
//!
//! | Field | Rule |
//! |-------|------|
//! | Environment | `environments[k mod len]` |
//! | Session | `resolve(trimester)[k mod len]` |
//! | Slot | `(d + g) mod 3` → Morning, Afternoon, Evening |
//!
//! Rows are sorted stably by (date, slot start, program).

use tracing::debug;

use crate::models::{
    CurriculumIndex, Environment, Group, Instructor, ScheduleRow, SolvedAssignment, TimeSlot,
    WorkingCalendar, NOT_AVAILABLE, STATUS_SCHEDULED,
};

/// Builds rows from a solved assignment.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleMaterializer<'a> {
    calendar: &'a WorkingCalendar,
    instructors: &'a [Instructor],
    groups: &'a [Group],
    environments: &'a [Environment],
    curriculum: &'a CurriculumIndex,
}

impl<'a> ScheduleMaterializer<'a> {
    pub fn new(
        calendar: &'a WorkingCalendar,
        instructors: &'a [Instructor],
        groups: &'a [Group],
        environments: &'a [Environment],
        curriculum: &'a CurriculumIndex,
    ) -> Self {
        Self {
            calendar,
            instructors,
            groups,
            environments,
            curriculum,
        }
    }

    /// One row per set cell; cells outside the entity lists are skipped.
    pub fn materialize(&self, assignment: &SolvedAssignment) -> Vec<ScheduleRow> {
        let mut rows: Vec<ScheduleRow> = assignment
            .assignments()
            .into_iter()
            .filter_map(|(i, d, g)| self.row(i, d, g, assignment.num_groups()))
            .collect();
        rows.sort_by(|a, b| {
            (a.date, a.start_time, &a.program).cmp(&(b.date, b.start_time, &b.program))
        });
        debug!(event = "materialized", rows = rows.len());
        rows
    }

    fn environment_for(&self, key: usize) -> &str {
        match self.environments.len() {
            0 => NOT_AVAILABLE,
            n => &self.environments[key % n].id,
        }
    }

    fn row(&self, i: usize, d: usize, g: usize, num_groups: usize) -> Option<ScheduleRow> {
        let instructor = self.instructors.get(i)?;
        let group = self.groups.get(g)?;
        let key = d * num_groups + g;
        let session = self.curriculum.session_for(&group.trimester, key);
        let slot = TimeSlot::from_rotation(d + g);

        Some(ScheduleRow {
            date: self.calendar.date_of(d),
            weekday: self.calendar.weekday_name(d).to_string(),
            slot,
            start_time: slot.start(),
            end_time: slot.end(),
            group_id: group.id.clone(),
            program: group.program.clone(),
            trimester: group.trimester.clone(),
            group_location: group.location.clone(),
            subject: session.subject.clone(),
            competency: session.competency.clone(),
            learning_outcome: session.learning_outcome.clone(),
            session_start: session.start,
            session_end: session.end,
            instructor: instructor.name.clone(),
            instructor_shift: instructor.shift_preference.clone(),
            instructor_exclusions: instructor.exclusions.clone(),
            environment: self.environment_for(key).to_string(),
            status: STATUS_SCHEDULED.to_string(),
            notes: String::new(),
            non_working_day: !self.calendar.is_working(d),
            day_index: d,
            group_index: g,
            instructor_index: i,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurriculumSession, TrimesterKey, PLACEHOLDER_SUBJECT};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    struct Fixture {
        calendar: WorkingCalendar,
        instructors: Vec<Instructor>,
        groups: Vec<Group>,
        environments: Vec<Environment>,
        curriculum: CurriculumIndex,
    }

    impl Fixture {
        fn new(curriculum: Vec<CurriculumSession>) -> Self {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            Self {
                calendar: WorkingCalendar::new(start, 7, &HashSet::new()),
                instructors: vec![
                    Instructor::new("Ana").with_shift_preference("Mañana"),
                    Instructor::new("Luis"),
                ],
                groups: vec![
                    Group::new("G1").with_program("Zootecnia").with_trimester("1"),
                    Group::new("G2").with_program("Agro").with_trimester("2"),
                ],
                environments: vec!["E1".into(), "E2".into(), "E3".into()],
                curriculum: CurriculumIndex::new(curriculum),
            }
        }

        fn materializer(&self) -> ScheduleMaterializer<'_> {
            ScheduleMaterializer::new(
                &self.calendar,
                &self.instructors,
                &self.groups,
                &self.environments,
                &self.curriculum,
            )
        }
    }

    fn two_day_grid() -> SolvedAssignment {
        let mut grid = SolvedAssignment::new(2, 7, 2);
        grid.assign(0, 0, 0);
        grid.assign(1, 0, 1);
        grid.assign(1, 1, 0);
        grid.assign(0, 1, 1);
        grid
    }

    #[test]
    fn test_rotation_rules() {
        let fx = Fixture::new(vec![
            CurriculumSession::new("S1").with_trimester("1"),
            CurriculumSession::new("S2").with_trimester("1"),
            CurriculumSession::new("T1").with_trimester("2"),
        ]);
        let rows = fx.materializer().materialize(&two_day_grid());
        assert_eq!(rows.len(), 4);

        let cell = |d: usize, g: usize| {
            rows.iter()
                .find(|r| r.day_index == d && r.group_index == g)
                .unwrap()
        };
        // key = d*2 + g
        assert_eq!(cell(0, 0).environment, "E1");
        assert_eq!(cell(0, 1).environment, "E2");
        assert_eq!(cell(1, 0).environment, "E3");
        assert_eq!(cell(1, 1).environment, "E1");

        assert_eq!(cell(0, 0).subject, "S1");
        assert_eq!(cell(1, 0).subject, "S1");
        assert_eq!(cell(0, 1).subject, "T1");

        assert_eq!(cell(0, 0).slot, TimeSlot::Morning);
        assert_eq!(cell(0, 1).slot, TimeSlot::Afternoon);
        assert_eq!(cell(1, 1).slot, TimeSlot::Evening);

        let first = cell(0, 0);
        assert_eq!(first.instructor, "Ana");
        assert_eq!(first.instructor_shift, "Mañana");
        assert_eq!(first.weekday, "Lunes");
        assert_eq!(first.status, STATUS_SCHEDULED);
        assert!(first.notes.is_empty());
        assert!(!first.non_working_day);
    }

    #[test]
    fn test_rows_sorted_by_date_slot_program() {
        let fx = Fixture::new(Vec::new());
        let rows = fx.materializer().materialize(&two_day_grid());
        let order: Vec<(usize, usize)> = rows.iter().map(|r| (r.day_index, r.group_index)).collect();
        // Day 1: G2 is Evening, G1 Afternoon.
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        for pair in rows.windows(2) {
            assert!((pair[0].date, pair[0].start_time) <= (pair[1].date, pair[1].start_time));
        }
    }

    #[test]
    fn test_placeholder_session_without_curriculum() {
        let fx = Fixture::new(Vec::new());
        let rows = fx.materializer().materialize(&two_day_grid());
        assert!(rows.iter().all(|r| r.subject == PLACEHOLDER_SUBJECT));
        assert!(rows.iter().all(|r| r.competency == NOT_AVAILABLE));
        assert_eq!(rows[0].trimester, TrimesterKey::default());
    }

    #[test]
    fn test_non_working_flag() {
        let fx = Fixture::new(Vec::new());
        let mut grid = SolvedAssignment::new(2, 7, 2);
        grid.assign(0, 5, 0); // Saturday
        let rows = fx.materializer().materialize(&grid);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].non_working_day);
        assert_eq!(rows[0].weekday, "Sábado");
    }

    #[test]
    fn test_idempotent() {
        let fx = Fixture::new(vec![CurriculumSession::new("S1")]);
        let m = fx.materializer();
        let grid = two_day_grid();
        assert_eq!(m.materialize(&grid), m.materialize(&grid));
    }

    proptest::proptest! {
        #[test]
        fn prop_rotation_depends_only_on_day_and_group(
            d in 0usize..7,
            g in 0usize..2,
            i in 0usize..2,
        ) {
            let fx = Fixture::new(vec![
                CurriculumSession::new("S1"),
                CurriculumSession::new("S2"),
                CurriculumSession::new("S3"),
            ]);
            let mut grid = SolvedAssignment::new(2, 7, 2);
            grid.assign(i, d, g);
            let rows = fx.materializer().materialize(&grid);
            proptest::prop_assert_eq!(rows.len(), 1);
            let row = &rows[0];
            let key = d * 2 + g;
            proptest::prop_assert_eq!(row.slot, TimeSlot::from_rotation(d + g));
            proptest::prop_assert_eq!(&row.environment, &fx.environments[key % 3].id);
            proptest::prop_assert_eq!(&row.subject, &format!("S{}", key % 3 + 1));
        }
    }

    #[test]
    fn test_same_program_keeps_group_order() {
        let mut fx = Fixture::new(Vec::new());
        fx.groups = vec![
            Group::new("A").with_program("P"),
            Group::new("B").with_program("P"),
            Group::new("C").with_program("P"),
        ];
        fx.instructors.push(Instructor::new("Eva"));
        let mut grid = SolvedAssignment::new(3, 7, 3);
        // Day 2: slots (2+0)%3=Evening, (2+1)%3=Morning, (2+2)%3=Afternoon.
        grid.assign(0, 2, 0);
        grid.assign(1, 2, 1);
        grid.assign(2, 2, 2);
        let ids: Vec<String> = fx
            .materializer()
            .materialize(&grid)
            .into_iter()
            .map(|r| r.group_id)
            .collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
    }
}
