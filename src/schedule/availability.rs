use tracing::debug;

use crate::config::{Markers, ScheduleLayout};
use crate::grid::Grid;
use super::types::{AssignmentState, Period};

/// A teacher column of a date's schedule sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub column: usize,
    /// Raw value of the wish row for this teacher
    pub wish: String,
}

/// Teachers registered on a date's schedule sheet, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Reads the header row and wish row of a schedule sheet.
    ///
    /// Names and wishes are kept exactly as written, so a padded header or
    /// marker does not match its clean form. Blank header cells are skipped.
    pub fn from_schedule(schedule: &Grid, layout: &ScheduleLayout) -> Self {
        let entries = (layout.staff_start_col..=schedule.last_column())
            .filter_map(|column| {
                let name = schedule.raw_value(layout.staff_row, column);
                if name.trim().is_empty() {
                    return None;
                }
                Some(RosterEntry {
                    name: name.to_string(),
                    column,
                    wish: schedule.raw_value(layout.wish_row, column).to_string(),
                })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// First column whose header is exactly `name`
    pub fn find(&self, name: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.find(name).map(|e| e.column)
    }
}

/// Whether `teacher` can take a lesson in `period`.
///
/// The teacher must be on the roster, have wished to work with exactly the
/// "available" marker, and not already be committed in that period.
pub fn is_available(
    teacher: &str,
    roster: &Roster,
    state: &AssignmentState,
    period: Period,
    markers: &Markers,
) -> bool {
    let Some(entry) = roster.find(teacher) else {
        debug!(teacher, "teacher not found on the date's roster");
        return false;
    };

    if entry.wish != markers.wish_true {
        debug!(teacher, wish = %entry.wish, "teacher has not wished to work");
        return false;
    }

    if state.is_assigned(period, teacher) {
        debug!(teacher, %period, "teacher already assigned in this period");
        return false;
    }

    true
}
