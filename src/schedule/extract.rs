use tracing::debug;

use crate::config::{Markers, TemplateLayout};
use crate::grid::Grid;
use super::registry;
use super::types::{Lesson, Period};

/// Reads the lessons of a weekday template.
///
/// Scans the three period rows (outer) and the grade columns (inner), both
/// ascending. Blank cells, the "no lesson" marker and free text that is not
/// a lesson code are skipped. Every lesson starts unassigned.
pub fn extract_lessons(template: &Grid, layout: &TemplateLayout, markers: &Markers) -> Vec<Lesson> {
    let mut lessons = Vec::new();

    for period in Period::ALL {
        let row = layout.first_period_row + period.offset();
        for col in layout.first_grade_col..=layout.last_grade_col {
            let Some(cell) = template.cell(row, col) else {
                continue;
            };
            let value = cell.value.trim();
            if value.is_empty() || value == markers.no_lesson {
                continue;
            }

            let Some((code, descriptor)) = registry::lookup(value) else {
                debug!(row, col, value, "template cell is not a lesson code, skipping");
                continue;
            };

            lessons.push(Lesson {
                code,
                period,
                grade_number: descriptor.grade_number,
                subject: descriptor.subject,
                grade_name: descriptor.grade_name.clone(),
                subject_name: descriptor.subject_name.to_string(),
                source_row: row,
                source_col: col,
                assigned_teacher: None,
                style: cell.style.clone(),
            });
        }
    }

    lessons
}
