use tracing::{debug, info, warn};

use crate::config::ScheduleLayout;
use crate::grid::Grid;
use crate::schedule::{Lesson, Period, Roster};

/// Empties the lesson area of a schedule sheet: every period row across all
/// teacher columns, content and formatting alike
pub fn clear_lesson_area(schedule: &mut Grid, layout: &ScheduleLayout) {
    let last_col = schedule.last_column();
    for period in Period::ALL {
        let row = layout.first_lesson_row + period.offset();
        for col in layout.staff_start_col..=last_col {
            schedule.clear(row, col);
        }
    }
    debug!(last_col, "cleared lesson area");
}

/// Writes assigned lessons into their teachers' columns.
///
/// The lesson area is cleared first, so lessons left unassigned leave no
/// trace. Each code lands in the teacher's column on its period row with the
/// template formatting. Returns how many lessons were written.
pub fn project_lessons(schedule: &mut Grid, lessons: &[Lesson], layout: &ScheduleLayout) -> usize {
    // Column lookup uses the header row as it was before clearing
    let roster = Roster::from_schedule(schedule, layout);
    clear_lesson_area(schedule, layout);

    let mut written = 0;
    for lesson in lessons {
        let Some(teacher) = lesson.assigned_teacher.as_deref() else {
            continue;
        };
        let Some(col) = roster.column_of(teacher) else {
            warn!(code = %lesson.code, teacher, "teacher column not found, lesson not written");
            continue;
        };

        let row = layout.first_lesson_row + lesson.period.offset();
        let cell = schedule.cell_mut(row, col);
        cell.value = lesson.code.to_string();
        cell.style = lesson.style.clone();
        written += 1;

        debug!(code = %lesson.code, teacher, row, col, "wrote lesson");
    }

    info!(written, total = lessons.len(), "schedule updated");
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::StyleSnapshot;
    use crate::schedule::LessonCode;

    fn lesson(code: &str, period: u8, teacher: Option<&str>) -> Lesson {
        let code: LessonCode = code.parse().unwrap();
        let descriptor = code.descriptor();
        Lesson {
            code,
            period: Period::new(period).unwrap(),
            grade_number: descriptor.grade_number,
            subject: descriptor.subject,
            grade_name: descriptor.grade_name.clone(),
            subject_name: descriptor.subject_name.to_string(),
            source_row: 2 + usize::from(period),
            source_col: 2 + usize::from(descriptor.grade_number),
            assigned_teacher: teacher.map(str::to_string),
            style: None,
        }
    }

    fn schedule() -> Grid {
        Grid::from_rows(vec![
            vec!["8/4", "A", "B", "C"],
            vec!["", "◯", "◯", "×"],
            vec!["", "old", "", "stale"],
            vec!["", "", "", ""],
            vec!["", "", "4S", ""],
        ])
    }

    #[test]
    fn writes_assigned_lessons_only() {
        let mut grid = schedule();
        let lessons = vec![
            lesson("3M", 1, Some("B")),
            lesson("6J", 3, Some("A")),
            lesson("1R", 2, None),
        ];

        let written = project_lessons(&mut grid, &lessons, &ScheduleLayout::default());

        assert_eq!(written, 2);
        assert_eq!(grid.value(3, 3), "3M");
        assert_eq!(grid.value(5, 2), "6J");
        // stale codes are cleared, not replaced
        assert_eq!(grid.value(3, 2), "");
        assert_eq!(grid.value(3, 4), "");
        assert_eq!(grid.value(5, 3), "");
        for col in 2..=4 {
            assert_eq!(grid.value(4, col), "");
        }
        // header and wish rows are untouched
        assert_eq!(grid.value(1, 2), "A");
        assert_eq!(grid.value(2, 4), "×");
    }

    #[test]
    fn reapplies_template_style_and_clears_old_formatting() {
        let mut grid = schedule();
        grid.set_style(4, 4, Some(StyleSnapshot {
            background: Some("#ff0000".to_string()),
            ..StyleSnapshot::default()
        }));
        let style = StyleSnapshot {
            background: Some("#cfe2f3".to_string()),
            ..StyleSnapshot::default()
        };
        let mut assigned = lesson("2J", 2, Some("A"));
        assigned.style = Some(style.clone());

        project_lessons(&mut grid, &[assigned], &ScheduleLayout::default());

        assert_eq!(grid.cell(4, 2).and_then(|c| c.style.clone()), Some(style));
        assert_eq!(grid.cell(4, 4).and_then(|c| c.style.clone()), None);
    }

    #[test]
    fn unknown_teacher_is_skipped() {
        let mut grid = schedule();
        let written = project_lessons(&mut grid, &[lesson("5M", 1, Some("Z"))], &ScheduleLayout::default());
        assert_eq!(written, 0);
        assert_eq!(grid.last_column(), 4);
    }
}
