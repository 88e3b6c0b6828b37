use tracing::{debug, info};

use crate::config::PriorityLayout;
use crate::error::StaffingError;
use crate::grid::Grid;
use super::registry::LessonCode;

/// Finds the priority-table column headed by `code`
pub fn find_lesson_column(code: LessonCode, table: &Grid, layout: &PriorityLayout) -> Option<usize> {
    let code = code.to_string();
    (1..=table.last_column()).find(|&col| table.value(layout.lesson_row, col) == code)
}

/// Ranked candidates for a lesson code, best first.
///
/// Reads the whole column down to the table's last populated row. Blank
/// cells are skipped rather than ending the list, so names added below a gap
/// are still honored. Returns `None` when the table has no column for the code.
pub fn priority_list(code: LessonCode, table: &Grid, layout: &PriorityLayout) -> Option<Vec<String>> {
    let Some(col) = find_lesson_column(code, table, layout) else {
        debug!(%code, "no priority column for lesson");
        return None;
    };

    let list: Vec<String> = (layout.first_priority_row..=table.last_row())
        .map(|row| table.value(row, col))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    debug!(%code, candidates = ?list, "priority list");
    Some(list)
}

/// Adds a teacher to the bottom of a lesson's priority column.
///
/// The name goes into the first empty priority cell of the column, or into a
/// new row below the table. Returns `false` when the teacher is already listed.
pub fn register_candidate(
    code: LessonCode,
    teacher: &str,
    table: &mut Grid,
    layout: &PriorityLayout,
) -> Result<bool, StaffingError> {
    let col = find_lesson_column(code, table, layout).ok_or_else(|| StaffingError::PriorityColumnMissing {
        code: code.to_string(),
    })?;

    let last_row = table.last_row();
    let rows = layout.first_priority_row..=last_row;
    if rows.clone().any(|row| table.value(row, col) == teacher) {
        debug!(%code, teacher, "teacher already in priority list");
        return Ok(false);
    }

    let row = rows
        .into_iter()
        .find(|&row| table.value(row, col).is_empty())
        .unwrap_or_else(|| (last_row + 1).max(layout.first_priority_row));
    table.set_value(row, col, teacher);

    info!(%code, teacher, row, "added teacher to priority list");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> LessonCode {
        s.parse().unwrap()
    }

    fn table() -> Grid {
        Grid::from_rows(vec![
            vec!["1M", "3M", "5J"],
            vec!["Sato", "A", "Kato"],
            vec!["", "", "Ito"],
            vec!["", "B", ""],
            vec!["Mori", "", ""],
        ])
    }

    #[test]
    fn scans_past_blank_cells() {
        let layout = PriorityLayout::default();
        assert_eq!(priority_list(code("3M"), &table(), &layout), Some(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(
            priority_list(code("1M"), &table(), &layout),
            Some(vec!["Sato".to_string(), "Mori".to_string()])
        );
    }

    #[test]
    fn missing_column_is_none() {
        assert_eq!(priority_list(code("1J"), &table(), &PriorityLayout::default()), None);
    }

    #[test]
    fn empty_column_is_an_empty_list() {
        let grid = Grid::from_rows(vec![vec!["2R", "1M"], vec!["", "X"]]);
        assert_eq!(priority_list(code("2R"), &grid, &PriorityLayout::default()), Some(vec![]));
    }

    #[test]
    fn register_fills_the_first_gap() {
        let layout = PriorityLayout::default();
        let mut grid = table();
        assert!(register_candidate(code("3M"), "C", &mut grid, &layout).unwrap());
        assert_eq!(grid.value(3, 2), "C");
        assert_eq!(
            priority_list(code("3M"), &grid, &layout).unwrap(),
            vec!["A".to_string(), "C".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn register_appends_below_a_full_column() {
        let layout = PriorityLayout::default();
        let mut grid = Grid::from_rows(vec![vec!["4S"], vec!["A"], vec!["B"]]);
        assert!(register_candidate(code("4S"), "C", &mut grid, &layout).unwrap());
        assert_eq!(grid.value(4, 1), "C");
    }

    #[test]
    fn register_is_a_no_op_for_listed_teachers() {
        let layout = PriorityLayout::default();
        let mut grid = table();
        assert!(!register_candidate(code("3M"), "B", &mut grid, &layout).unwrap());
        assert_eq!(grid, table());
    }

    #[test]
    fn register_requires_the_column() {
        let mut grid = table();
        let result = register_candidate(code("6S"), "A", &mut grid, &PriorityLayout::default());
        assert!(matches!(result, Err(StaffingError::PriorityColumnMissing { .. })));
    }
}
