use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use crate::config::{Config, Markers, StaffLayout};
use crate::display::{PriorityAddition, PrioritySync, WishReflection};
use crate::error::StaffingError;
use crate::grid::Grid;
use crate::schedule::{register_candidate, LessonCode};
use crate::staffing::{date_sheets, parse_sheet_date};
use crate::workbook::Workbook;

/// A teacher listed on the Main sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    /// Also the name of the teacher's own sheet
    pub full_name: String,
    pub display_name: String,
    /// Position in the staff list, counting blank rows
    pub index: usize,
}

/// Reads the staff list. Rows missing either name are skipped but still take up a position.
pub fn staff_list(workbook: &Workbook, config: &Config) -> Result<Vec<StaffMember>, StaffingError> {
    let main = workbook
        .sheet(&config.sheets.main)
        .ok_or_else(|| StaffingError::StaffListMissing {
            sheet: config.sheets.main.clone(),
        })?;
    let layout = &config.staff_list;

    Ok((layout.first_row..=layout.last_row)
        .enumerate()
        .filter_map(|(index, row)| {
            let full_name = main.raw_value(row, layout.full_name_col);
            let display_name = main.raw_value(row, layout.display_name_col);
            if full_name.trim().is_empty() || display_name.trim().is_empty() {
                return None;
            }
            Some(StaffMember {
                full_name: full_name.to_string(),
                display_name: display_name.to_string(),
                index,
            })
        })
        .collect())
}

/// The wish a teacher's own sheet records for `date`; `None` when the date is not listed
pub fn wish_for_date<'a>(sheet: &'a Grid, date: NaiveDate, layout: &StaffLayout) -> Option<&'a str> {
    (layout.first_date_row..=sheet.last_row())
        .find(|&row| parse_sheet_date(sheet.value(row, layout.date_col), date.year()) == Some(date))
        .map(|row| sheet.raw_value(row, layout.wish_col))
}

/// Lesson codes a teacher's matrix marks as teachable, grade by grade
pub fn teachable_lessons(sheet: &Grid, layout: &StaffLayout, markers: &Markers) -> Vec<LessonCode> {
    LessonCode::all()
        .filter(|code| {
            let row = layout.preschool_row + usize::from(code.grade());
            let col = layout.first_subject_col + code.subject().index();
            sheet.raw_value(row, col) == markers.wish_true
        })
        .collect()
}

/// Copies every teacher's wish for each date onto the date sheet's wish row.
///
/// The teacher's column is the staff list position offset from the first
/// staff column. Only the exact "available" marker is copied as available;
/// any other value, or a date the teacher's sheet does not list, is written
/// as unavailable. Teachers without their own sheet are left untouched.
pub fn reflect_wishes(workbook: &mut Workbook, config: &Config, year: i32) -> Result<WishReflection, StaffingError> {
    let staff = staff_list(workbook, config)?;
    if staff.is_empty() {
        warn!("staff list is empty, no wishes to reflect");
        return Ok(WishReflection::default());
    }

    let (sheets, skipped) = date_sheets(workbook, config, year);
    let mut reflection = WishReflection {
        skipped,
        ..WishReflection::default()
    };

    for (sheet, date) in sheets {
        let mut marks = Vec::new();
        for member in &staff {
            let Some(own_sheet) = workbook.sheet(&member.full_name) else {
                debug!(teacher = %member.full_name, "teacher has no sheet of their own");
                continue;
            };
            let available = wish_for_date(own_sheet, date, &config.staff) == Some(config.markers.wish_true.as_str());
            marks.push((config.schedule.staff_start_col + member.index, available));
        }
        if marks.is_empty() {
            continue;
        }

        let Some(grid) = workbook.sheet_mut(&sheet) else {
            continue;
        };
        for (col, available) in marks {
            let marker = if available {
                reflection.available += 1;
                &config.markers.wish_true
            } else {
                reflection.unavailable += 1;
                &config.markers.wish_false
            };
            grid.set_value(config.schedule.wish_row, col, marker.as_str());
        }
        workbook.save_sheet(&sheet)?;
        reflection.sheets_updated += 1;
        debug!(sheet = %sheet, date = %date, "wishes reflected");
    }

    info!(
        sheets = reflection.sheets_updated,
        available = reflection.available,
        unavailable = reflection.unavailable,
        "wishes reflected"
    );
    Ok(reflection)
}

/// Adds each teacher to the priority list of every lesson their own sheet marks as teachable
pub fn sync_priority_from_staff(workbook: &mut Workbook, config: &Config) -> Result<PrioritySync, StaffingError> {
    let staff = staff_list(workbook, config)?;
    let priority_name = config.sheets.priority.clone();
    let missing_table = || StaffingError::PriorityTableMissing {
        sheet: priority_name.clone(),
    };
    if workbook.sheet(&priority_name).is_none() {
        return Err(missing_table());
    }

    let mut sync = PrioritySync::default();
    for member in &staff {
        let Some(own_sheet) = workbook.sheet(&member.full_name) else {
            debug!(teacher = %member.full_name, "teacher has no sheet of their own");
            continue;
        };
        let codes = teachable_lessons(own_sheet, &config.staff, &config.markers);

        let table = workbook.sheet_mut(&priority_name).ok_or_else(missing_table)?;
        for code in codes {
            match register_candidate(code, &member.display_name, table, &config.priority) {
                Ok(true) => sync.added.push(PriorityAddition {
                    teacher: member.display_name.clone(),
                    lesson_code: code.to_string(),
                }),
                Ok(false) => {}
                Err(StaffingError::PriorityColumnMissing { code }) => {
                    warn!(%code, teacher = %member.display_name, "no priority column for a teachable lesson");
                    if !sync.missing_columns.contains(&code) {
                        sync.missing_columns.push(code);
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    if !sync.added.is_empty() {
        workbook.save_sheet(&priority_name)?;
    }
    info!(added = sync.added.len(), "priority table updated from staff sheets");
    Ok(sync)
}
