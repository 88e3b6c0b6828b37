use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::StaffingError;
use crate::schedule::Lesson;

/// A lesson nobody could be found for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnassignedLesson {
    pub date: String,
    pub period: u8,
    pub lesson_code: String,
    pub grade: String,
    pub subject: String,
}

/// Result of staffing one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub unassigned_details: Vec<UnassignedLesson>,
}

/// A date whose run was aborted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateFailure {
    pub sheet: String,
    pub reason: String,
}

/// Totals over every date of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_sheets: usize,
    pub processed_count: usize,
    pub total_lessons: usize,
    pub total_assigned: usize,
    pub total_unassigned: usize,
    pub unassigned_details: Vec<UnassignedLesson>,
    pub failures: Vec<DateFailure>,
}

/// Counts assigned and unassigned lessons. Unassigned ones are listed in the order given.
pub fn summarize(date: &str, lessons: &[Lesson]) -> DaySummary {
    let unassigned_details: Vec<UnassignedLesson> = lessons
        .iter()
        .filter(|l| !l.is_assigned())
        .map(|l| UnassignedLesson {
            date: date.to_string(),
            period: l.period.number(),
            lesson_code: l.code.to_string(),
            grade: l.grade_name.clone(),
            subject: l.subject_name.clone(),
        })
        .collect();

    DaySummary {
        date: date.to_string(),
        total: lessons.len(),
        assigned: lessons.len() - unassigned_details.len(),
        unassigned: unassigned_details.len(),
        unassigned_details,
    }
}

impl BatchSummary {
    pub fn absorb(&mut self, day: &DaySummary) {
        self.processed_count += 1;
        self.total_lessons += day.total;
        self.total_assigned += day.assigned;
        self.total_unassigned += day.unassigned;
        self.unassigned_details.extend(day.unassigned_details.iter().cloned());
    }
}

/// Formats a lesson as e.g. "3M (小3算数)"
pub fn format_lesson(code: &str, grade: &str, subject: &str) -> String {
    format!("{} ({}{})", code, grade, subject)
}

fn format_unassigned(detail: &UnassignedLesson) -> String {
    format!(
        "{} period {} {}",
        detail.date,
        detail.period,
        format_lesson(&detail.lesson_code, &detail.grade, &detail.subject)
    )
}

/// Human-readable report for one date, listing every lesson and who teaches it
pub struct DayReport<'a> {
    pub summary: &'a DaySummary,
    pub lessons: &'a [Lesson],
}

impl fmt::Display for DayReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Staffing for {} ===", self.summary.date)?;
        writeln!(f, "Total lessons: {}", self.summary.total)?;
        writeln!(f, "Assigned: {}", self.summary.assigned)?;
        writeln!(f, "Unassigned: {}", self.summary.unassigned)?;

        for (index, lesson) in self.lessons.iter().enumerate() {
            let status = match &lesson.assigned_teacher {
                Some(teacher) => format!("✅ {}", teacher),
                None => "❌ unassigned".to_string(),
            };
            writeln!(
                f,
                "  {}. period {} {} - {}",
                index + 1,
                lesson.period,
                format_lesson(&lesson.code.to_string(), &lesson.grade_name, &lesson.subject_name),
                status
            )?;
        }

        if self.summary.unassigned > 0 {
            writeln!(f, "⚠️  Unassigned lessons are not written to the schedule.")?;
        }
        Ok(())
    }
}

pub fn render_day_report(summary: &DaySummary, lessons: &[Lesson]) -> String {
    DayReport { summary, lessons }.to_string()
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Staffing for all dates ===")?;
        if self.total_unassigned == 0 && self.failures.is_empty() {
            writeln!(f, "✅ Every lesson on every date has a teacher.")?;
        } else {
            writeln!(f, "⚠️  Some lessons could not be staffed.")?;
        }
        writeln!(f, "Dates processed: {}/{}", self.processed_count, self.total_sheets)?;
        writeln!(f, "Total lessons: {}", self.total_lessons)?;
        writeln!(f, "Assigned: {}", self.total_assigned)?;
        writeln!(f, "Unassigned: {}", self.total_unassigned)?;

        if !self.unassigned_details.is_empty() {
            writeln!(f, "\nUnassigned lessons:")?;
            for (index, detail) in self.unassigned_details.iter().enumerate() {
                writeln!(f, "  {}. {}", index + 1, format_unassigned(detail))?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f, "\nDates not processed:")?;
            for failure in &self.failures {
                writeln!(f, "  - {}: {}", failure.sheet, failure.reason)?;
            }
        }
        Ok(())
    }
}

/// Human-readable report for a batch run
pub fn render_batch_report(summary: &BatchSummary) -> String {
    summary.to_string()
}

/// Wish markers copied from the teachers' own sheets onto the date sheets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WishReflection {
    pub sheets_updated: usize,
    pub available: usize,
    pub unavailable: usize,
    pub skipped: Vec<DateFailure>,
}

impl fmt::Display for WishReflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Wishes reflected ===")?;
        writeln!(f, "Date sheets updated: {}", self.sheets_updated)?;
        writeln!(f, "Available: {}", self.available)?;
        writeln!(f, "Unavailable: {}", self.unavailable)?;
        for skipped in &self.skipped {
            writeln!(f, "  - {}: {}", skipped.sheet, skipped.reason)?;
        }
        Ok(())
    }
}

/// A teacher appended to a lesson's priority list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityAddition {
    pub teacher: String,
    pub lesson_code: String,
}

/// Teachers added to the priority table from their own sheets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrioritySync {
    pub added: Vec<PriorityAddition>,
    /// Lesson codes a teacher can teach that have no priority column
    pub missing_columns: Vec<String>,
}

impl fmt::Display for PrioritySync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Priority table updated ===")?;
        if self.added.is_empty() {
            writeln!(f, "Every teacher is already listed.")?;
        }
        for addition in &self.added {
            writeln!(f, "  + {} -> {}", addition.teacher, addition.lesson_code)?;
        }
        if !self.missing_columns.is_empty() {
            writeln!(f, "No priority column for: {}", self.missing_columns.join(", "))?;
        }
        Ok(())
    }
}

/// Writes a rendered report to a file
pub fn write_report_to_file<P: AsRef<Path>>(report: &str, path: P) -> Result<(), StaffingError> {
    let path = path.as_ref();
    fs::write(path, report).map_err(|source| StaffingError::Io {
        path: path.to_path_buf(),
        source,
    })
}
