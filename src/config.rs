use std::fs;
use std::path::Path;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::StaffingError;

/// Layout of the workbook and the marker glyphs the school uses.
///
/// All rows and columns are 1-based, the way the sheets are addressed.
/// Every field has a default, so a JSON override only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub template: TemplateLayout,
    pub schedule: ScheduleLayout,
    pub priority: PriorityLayout,
    pub staff_list: StaffListLayout,
    pub staff: StaffLayout,
    pub markers: Markers,
    pub sheets: SheetNames,
}

/// Weekday template sheets: one row per period, one column per grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub first_period_row: usize,
    /// Kindergarten column; it never holds a registered code but is scanned anyway.
    pub first_grade_col: usize,
    pub last_grade_col: usize,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            first_period_row: 3,
            first_grade_col: 2,
            last_grade_col: 8,
        }
    }
}

/// Per-date schedule sheets: teacher header row, wish row, then one row per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleLayout {
    pub date_row: usize,
    pub date_col: usize,
    pub staff_row: usize,
    pub staff_start_col: usize,
    pub wish_row: usize,
    pub first_lesson_row: usize,
}

impl Default for ScheduleLayout {
    fn default() -> Self {
        Self {
            date_row: 1,
            date_col: 1,
            staff_row: 1,
            staff_start_col: 2,
            wish_row: 2,
            first_lesson_row: 3,
        }
    }
}

/// Priority table: lesson codes across the header row, ranked teachers below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityLayout {
    pub lesson_row: usize,
    pub first_priority_row: usize,
}

impl Default for PriorityLayout {
    fn default() -> Self {
        Self {
            lesson_row: 1,
            first_priority_row: 2,
        }
    }
}

/// Staff list on the Main sheet, one teacher per row.
///
/// A teacher's position in the list is also the offset of their column on
/// every date schedule sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffListLayout {
    pub first_row: usize,
    pub last_row: usize,
    /// Full name, which is also the name of the teacher's own sheet
    pub full_name_col: usize,
    /// Short name used on schedules and in the priority table
    pub display_name_col: usize,
}

impl Default for StaffListLayout {
    fn default() -> Self {
        Self {
            first_row: 4,
            last_row: 13,
            full_name_col: 4,
            display_name_col: 5,
        }
    }
}

/// A teacher's own sheet: dated wishes in the left columns, and a grade by
/// subject matrix of what they can teach further right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffLayout {
    pub first_date_row: usize,
    pub date_col: usize,
    pub wish_col: usize,
    /// Kindergarten row of the matrix; grade N sits N rows below
    pub preschool_row: usize,
    /// Math column of the matrix; the other subjects follow in weight order
    pub first_subject_col: usize,
}

impl Default for StaffLayout {
    fn default() -> Self {
        Self {
            first_date_row: 5,
            date_col: 1,
            wish_col: 2,
            preschool_row: 5,
            first_subject_col: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// The only wish value that makes a teacher available.
    pub wish_true: String,
    pub wish_false: String,
    /// Template cells holding this value mean "no lesson".
    pub no_lesson: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            wish_true: "◯".to_string(),
            wish_false: "×".to_string(),
            no_lesson: "なし".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub priority: String,
    /// Sheet holding the staff list
    pub main: String,
    /// Template sheet names, Monday first.
    pub weekdays: [String; 7],
    /// Sheets that are never treated as date schedules even if their name looks like one.
    pub reserved: Vec<String>,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            priority: "Priority".to_string(),
            main: "Main".to_string(),
            weekdays: ["月", "火", "水", "木", "金", "土", "日"].map(String::from),
            reserved: vec![
                "Main".to_string(),
                "Template_Daily".to_string(),
                "Template_Staff".to_string(),
            ],
        }
    }
}

impl SheetNames {
    /// Name of the template sheet used for dates falling on `weekday`
    pub fn template_for(&self, weekday: Weekday) -> &str {
        &self.weekdays[weekday.num_days_from_monday() as usize]
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.priority
            || name == self.main
            || self.weekdays.iter().any(|w| w == name) || self.reserved.iter().any(|r| r == name)
    }
}

impl Config {
    /// Loads a JSON override file; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StaffingError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StaffingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| StaffingError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every row and column is 1-based and every range is non-empty
    pub fn validate(&self) -> Result<(), StaffingError> {
        let positions = [
            ("template.first_period_row", self.template.first_period_row),
            ("template.first_grade_col", self.template.first_grade_col),
            ("template.last_grade_col", self.template.last_grade_col),
            ("schedule.date_row", self.schedule.date_row),
            ("schedule.date_col", self.schedule.date_col),
            ("schedule.staff_row", self.schedule.staff_row),
            ("schedule.staff_start_col", self.schedule.staff_start_col),
            ("schedule.wish_row", self.schedule.wish_row),
            ("schedule.first_lesson_row", self.schedule.first_lesson_row),
            ("priority.lesson_row", self.priority.lesson_row),
            ("priority.first_priority_row", self.priority.first_priority_row),
            ("staff_list.first_row", self.staff_list.first_row),
            ("staff_list.last_row", self.staff_list.last_row),
            ("staff_list.full_name_col", self.staff_list.full_name_col),
            ("staff_list.display_name_col", self.staff_list.display_name_col),
            ("staff.first_date_row", self.staff.first_date_row),
            ("staff.date_col", self.staff.date_col),
            ("staff.wish_col", self.staff.wish_col),
            ("staff.preschool_row", self.staff.preschool_row),
            ("staff.first_subject_col", self.staff.first_subject_col),
        ];
        if let Some((field, _)) = positions.iter().find(|(_, value)| *value == 0) {
            return Err(StaffingError::InvalidConfig(format!("{} must be 1 or more", field)));
        }

        if self.template.first_grade_col > self.template.last_grade_col {
            return Err(StaffingError::InvalidConfig(
                "template.first_grade_col is after template.last_grade_col".to_string(),
            ));
        }
        if self.staff_list.first_row > self.staff_list.last_row {
            return Err(StaffingError::InvalidConfig(
                "staff_list.first_row is after staff_list.last_row".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "markers": { "wish_true": "o" } }"#).unwrap();
        assert_eq!(config.markers.wish_true, "o");
        assert_eq!(config.markers.wish_false, "×");
        assert_eq!(config.template, TemplateLayout::default());
        assert_eq!(config.sheets.priority, "Priority");
    }

    #[test]
    fn weekday_template_names() {
        let sheets = SheetNames::default();
        assert_eq!(sheets.template_for(Weekday::Mon), "月");
        assert_eq!(sheets.template_for(Weekday::Sun), "日");
        assert!(sheets.is_reserved("土"));
        assert!(sheets.is_reserved("Priority"));
        assert!(sheets.is_reserved("Main"));
        assert!(!sheets.is_reserved("8-4"));
    }

    #[test]
    fn zero_based_override_is_rejected() {
        assert!(Config::default().validate().is_ok());

        let config: Config = serde_json::from_str(r#"{ "schedule": { "first_lesson_row": 0 } }"#).unwrap();
        let error = config.validate().unwrap_err();
        assert!(matches!(error, StaffingError::InvalidConfig(ref reason) if reason.contains("schedule.first_lesson_row")));

        let config: Config = serde_json::from_str(r#"{ "template": { "first_grade_col": 9 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(StaffingError::InvalidConfig(_))));
    }

    #[test]
    fn load_validates_the_file() {
        let path = std::env::temp_dir().join(format!("class-staffing-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "priority": { "lesson_row": 0 } }"#).unwrap();
        let result = Config::load(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(StaffingError::InvalidConfig(_))));
    }
}
