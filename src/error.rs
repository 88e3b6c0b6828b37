use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a staffing run.
///
/// Lookup misses (unknown teacher, lesson code without a priority column) and
/// unstaffed lessons are not errors; they are logged and reported in the summary.
#[derive(Debug, Error)]
pub enum StaffingError {
    /// The schedule sheet for the requested date does not exist.
    #[error("schedule sheet for {date} not found")]
    ScheduleMissing { date: String },

    /// The weekday template the date maps to does not exist.
    #[error("weekday template sheet `{sheet}` not found")]
    TemplateMissing { sheet: String },

    /// The priority table does not exist.
    #[error("priority table sheet `{sheet}` not found")]
    PriorityTableMissing { sheet: String },

    /// The Main sheet with the staff list does not exist.
    #[error("staff list sheet `{sheet}` not found")]
    StaffListMissing { sheet: String },

    /// A layout override points at row or column 0, or at an empty range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A priority table has no column for the given lesson code.
    #[error("priority table has no column for lesson {code}")]
    PriorityColumnMissing { code: String },

    /// A value is not one of the 24 registered lesson codes.
    #[error("`{0}` is not a lesson code (expected a grade 1-6 followed by M, J, R or S)")]
    InvalidLessonCode(String),

    /// A date cell or sheet name could not be turned into a calendar date.
    #[error("cannot read a date from `{0}`")]
    InvalidDate(String),

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read sheet {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
