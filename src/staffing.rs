use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::config::Config;
use crate::display::{summarize, BatchSummary, DateFailure, DaySummary};
use crate::error::StaffingError;
use crate::grid::Grid;
use crate::schedule::{assign_teachers, extract_lessons, Lesson, Roster};
use crate::workbook::Workbook;
use crate::writer::project_lessons;

static DATE_SHEET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})$").unwrap());

/// Outcome of staffing one date
#[derive(Debug, Clone)]
pub struct DateRun {
    /// Lessons in template order, with their teachers filled in
    pub lessons: Vec<Lesson>,
    pub summary: DaySummary,
    /// Lessons written to the schedule sheet
    pub written: usize,
}

/// Staffs one date from explicitly supplied sheets.
///
/// Extracts the lessons from the weekday template, assigns teachers using the
/// date's roster and the priority table, and projects the result onto
/// `schedule`. A template without lessons leaves the schedule untouched.
pub fn staff_date(
    label: &str,
    schedule: &mut Grid,
    template: &Grid,
    priority_table: &Grid,
    config: &Config,
) -> DateRun {
    let mut lessons = extract_lessons(template, &config.template, &config.markers);
    info!(date = label, lessons = lessons.len(), "extracted lessons");

    if lessons.is_empty() {
        warn!(date = label, "template has no lessons, schedule left as is");
        return DateRun {
            summary: summarize(label, &lessons),
            lessons,
            written: 0,
        };
    }

    let roster = Roster::from_schedule(schedule, &config.schedule);
    assign_teachers(&mut lessons, &roster, priority_table, config);
    let written = project_lessons(schedule, &lessons, &config.schedule);

    let summary = summarize(label, &lessons);
    info!(
        date = label,
        total = summary.total,
        assigned = summary.assigned,
        unassigned = summary.unassigned,
        "date staffed"
    );
    DateRun {
        lessons,
        summary,
        written,
    }
}

/// Display form of a date, e.g. "8/4"
pub fn date_label(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Whether a sheet name has the `M/d` (or `M-d`) shape of a date schedule
pub fn is_date_sheet_name(name: &str, config: &Config) -> bool {
    DATE_SHEET_REGEX.is_match(name) && !config.sheets.is_reserved(name)
}

/// Reads a date from `M/d`, `M-d`, `YYYY-MM-DD` or `YYYY/MM/DD`; short forms take `year`
pub fn parse_sheet_date(value: &str, year: i32) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(caps) = DATE_SHEET_REGEX.captures(value) {
        let month = caps[1].parse().ok()?;
        let day = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
}

/// Name of the schedule sheet for `date`, trying `M/d` then `M-d`
pub fn find_date_sheet(workbook: &Workbook, date: NaiveDate) -> Option<String> {
    [
        format!("{}/{}", date.month(), date.day()),
        format!("{}-{}", date.month(), date.day()),
    ]
    .into_iter()
    .find(|name| workbook.sheet(name).is_some())
}

/// Staffs the schedule sheet `sheet` for `date` and saves it.
///
/// Fails without touching the workbook when the template for the date's
/// weekday or the priority table is missing.
fn run_sheet(workbook: &mut Workbook, config: &Config, sheet: &str, date: NaiveDate) -> Result<DateRun, StaffingError> {
    let template_name = config.sheets.template_for(date.weekday()).to_string();
    let priority_name = config.sheets.priority.clone();
    info!(sheet, date = %date, template = %template_name, "staffing date");

    let (schedule, shared) = workbook.split_sheet_mut(sheet, &[&template_name, &priority_name]);
    let schedule = schedule.ok_or_else(|| StaffingError::ScheduleMissing {
        date: date_label(date),
    })?;
    let template = shared[0].ok_or_else(|| StaffingError::TemplateMissing {
        sheet: template_name.clone(),
    })?;
    let priority_table = shared[1].ok_or_else(|| StaffingError::PriorityTableMissing {
        sheet: priority_name.clone(),
    })?;

    let run = staff_date(&date_label(date), schedule, template, priority_table, config);
    if !run.lessons.is_empty() {
        workbook.save_sheet(sheet)?;
    }
    Ok(run)
}

/// Staffs a single date of the workbook
pub fn run_date(workbook: &mut Workbook, config: &Config, date: NaiveDate) -> Result<DateRun, StaffingError> {
    let sheet = find_date_sheet(workbook, date).ok_or_else(|| StaffingError::ScheduleMissing {
        date: date_label(date),
    })?;
    run_sheet(workbook, config, &sheet, date)
}

/// Lessons a date would have, without assigning anyone
pub fn preview_lessons(workbook: &Workbook, config: &Config, date: NaiveDate) -> Result<Vec<Lesson>, StaffingError> {
    let template_name = config.sheets.template_for(date.weekday());
    let template = workbook.sheet(template_name).ok_or_else(|| StaffingError::TemplateMissing {
        sheet: template_name.to_string(),
    })?;
    Ok(extract_lessons(template, &config.template, &config.markers))
}

/// Date schedule sheets of the workbook with their dates, in calendar order,
/// plus the sheets whose date could not be read
pub fn date_sheets(workbook: &Workbook, config: &Config, year: i32) -> (Vec<(String, NaiveDate)>, Vec<DateFailure>) {
    let mut sheets = Vec::new();
    let mut unreadable = Vec::new();
    for name in workbook.sheet_names().filter(|n| is_date_sheet_name(n, config)) {
        let date_cell = workbook
            .sheet(name)
            .map(|g| g.value(config.schedule.date_row, config.schedule.date_col))
            .unwrap_or("");

        match parse_sheet_date(date_cell, year).or_else(|| parse_sheet_date(name, year)) {
            Some(date) => sheets.push((name.to_string(), date)),
            None => {
                let error = StaffingError::InvalidDate(date_cell.to_string());
                warn!(sheet = name, %error, "skipping sheet");
                unreadable.push(DateFailure {
                    sheet: name.to_string(),
                    reason: error.to_string(),
                });
            }
        }
    }
    sheets.sort_by(|a, b| (a.1, &a.0).cmp(&(b.1, &b.0)));
    (sheets, unreadable)
}

/// Staffs every date schedule in the workbook.
///
/// The priority table must exist. Each date runs on its own: a missing
/// template or an unreadable date is recorded as a failure and the batch
/// moves on. Dates whose template has no lessons are skipped.
pub fn run_all(workbook: &mut Workbook, config: &Config, year: i32) -> Result<BatchSummary, StaffingError> {
    if workbook.sheet(&config.sheets.priority).is_none() {
        return Err(StaffingError::PriorityTableMissing {
            sheet: config.sheets.priority.clone(),
        });
    }

    let (sheets, unreadable) = date_sheets(workbook, config, year);
    let mut summary = BatchSummary {
        total_sheets: sheets.len() + unreadable.len(),
        failures: unreadable,
        ..BatchSummary::default()
    };
    info!(dates = sheets.len(), "staffing all dates");

    for (sheet, date) in sheets {
        match run_sheet(workbook, config, &sheet, date) {
            Ok(run) if run.lessons.is_empty() => {
                info!(sheet = %sheet, "no lessons on this date, skipped");
            }
            Ok(run) => summary.absorb(&run.summary),
            Err(error) => {
                warn!(sheet = %sheet, %error, "date not staffed");
                summary.failures.push(DateFailure {
                    sheet,
                    reason: error.to_string(),
                });
            }
        }
    }

    info!(
        processed = summary.processed_count,
        total = summary.total_sheets,
        unassigned = summary.total_unassigned,
        "batch finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Grid {
        let mut grid = Grid::new();
        grid.set_value(1, 1, "日");
        grid.set_value(3, 5, "3M");
        grid.set_value(3, 7, "5J");
        grid.set_value(4, 3, "1J");
        grid.set_value(4, 4, "メモ");
        grid
    }

    fn schedule(date: &str) -> Grid {
        Grid::from_rows(vec![
            vec![date, "A", "B", "C"],
            vec!["", "◯", "◯", "×"],
            vec!["", "", "", "old"],
        ])
    }

    fn priority() -> Grid {
        Grid::from_rows(vec![vec!["3M", "5J"], vec!["A", "A"], vec!["", "B"]])
    }

    fn workbook() -> Workbook {
        let mut workbook = Workbook::in_memory();
        // 2024-08-04 and 2024-08-11 are Sundays, 2024-08-05 a Monday
        workbook.insert_sheet("日", template());
        workbook.insert_sheet("Priority", priority());
        workbook.insert_sheet("8-4", schedule("8/4"));
        workbook.insert_sheet("8-11", schedule("8/11"));
        workbook.insert_sheet("8-5", schedule("8/5"));
        workbook.insert_sheet("Main", Grid::from_rows(vec![vec!["staff"]]));
        workbook
    }

    #[test]
    fn staffs_one_date_from_explicit_sheets() {
        let mut grid = schedule("8/4");
        let run = staff_date("8/4", &mut grid, &template(), &priority(), &Config::default());

        // 5J outranks 3M and takes A; 3M falls back to B; 1J has no priority column
        assert_eq!(run.summary.total, 3);
        assert_eq!(run.summary.assigned, 2);
        assert_eq!(run.summary.unassigned_details[0].lesson_code, "1J");
        assert_eq!(run.written, 2);
        assert_eq!(grid.value(3, 2), "5J");
        assert_eq!(grid.value(3, 3), "3M");
        assert_eq!(grid.value(3, 4), "");
    }

    #[test]
    fn empty_template_leaves_schedule_alone() {
        let mut grid = schedule("8/4");
        let run = staff_date("8/4", &mut grid, &Grid::new(), &priority(), &Config::default());
        assert_eq!(run.summary.total, 0);
        assert_eq!(grid, schedule("8/4"));
    }

    #[test]
    fn run_date_finds_sheet_and_template() {
        let mut workbook = workbook();
        let date = NaiveDate::from_ymd_opt(2024, 8, 4).unwrap();
        let run = run_date(&mut workbook, &Config::default(), date).unwrap();
        assert_eq!(run.summary.date, "8/4");
        assert_eq!(workbook.sheet("8-4").unwrap().value(3, 2), "5J");
    }

    #[test]
    fn structural_misses_are_errors() {
        let mut workbook = workbook();
        let config = Config::default();

        let missing_sheet = run_date(&mut workbook, &config, NaiveDate::from_ymd_opt(2024, 8, 6).unwrap());
        assert!(matches!(missing_sheet, Err(StaffingError::ScheduleMissing { .. })));

        // 8/5 is a Monday and there is no 月 template
        let missing_template = run_date(&mut workbook, &config, NaiveDate::from_ymd_opt(2024, 8, 5).unwrap());
        assert!(matches!(missing_template, Err(StaffingError::TemplateMissing { ref sheet }) if sheet == "月"));
        assert_eq!(workbook.sheet("8-5"), Some(&schedule("8/5")));
    }

    #[test]
    fn batch_isolates_failing_dates() {
        let mut workbook = workbook();
        let summary = run_all(&mut workbook, &Config::default(), 2024).unwrap();

        assert_eq!(summary.total_sheets, 3);
        assert_eq!(summary.processed_count, 2);
        assert_eq!(summary.total_lessons, 6);
        assert_eq!(summary.total_assigned, 4);
        assert_eq!(summary.total_unassigned, 2);
        let dates: Vec<&str> = summary.unassigned_details.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["8/4", "8/11"]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].sheet, "8-5");
        assert_eq!(workbook.sheet("8-11").unwrap().value(3, 3), "3M");
    }

    #[test]
    fn batch_needs_the_priority_table() {
        let mut workbook = Workbook::in_memory();
        workbook.insert_sheet("8-4", schedule("8/4"));
        let result = run_all(&mut workbook, &Config::default(), 2024);
        assert!(matches!(result, Err(StaffingError::PriorityTableMissing { .. })));
    }

    #[test]
    fn dates_run_in_calendar_order_across_years() {
        let mut workbook = Workbook::in_memory();
        workbook.insert_sheet("1-6", schedule("2025-01-06"));
        workbook.insert_sheet("12-30", schedule("12/30"));
        workbook.insert_sheet("12-25", schedule("12/25"));
        workbook.insert_sheet("9-9", schedule("someday"));
        workbook.insert_sheet("9-31", schedule("9/31"));

        let (sheets, unreadable) = date_sheets(&workbook, &Config::default(), 2024);
        let names: Vec<&str> = sheets.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["9-9", "12-25", "12-30", "1-6"]);
        // the date cell wins over the sheet name when it parses
        assert_eq!(sheets[3].1, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(unreadable.len(), 1);
        assert_eq!(unreadable[0].sheet, "9-31");
    }

    #[test]
    fn date_parsing() {
        assert_eq!(parse_sheet_date("8/4", 2024), NaiveDate::from_ymd_opt(2024, 8, 4));
        assert_eq!(parse_sheet_date("12-25", 2024), NaiveDate::from_ymd_opt(2024, 12, 25));
        assert_eq!(parse_sheet_date("2025-01-06", 2024), NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(parse_sheet_date("2/30", 2024), None);
        assert_eq!(parse_sheet_date("Priority", 2024), None);
        assert!(is_date_sheet_name("7/30", &Config::default()));
        assert!(!is_date_sheet_name("Template_Daily", &Config::default()));
    }
}
