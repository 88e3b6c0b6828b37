use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::StyleSnapshot;
use super::registry::{LessonCode, Subject};

/// One of the three daily time slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Period(u8);

impl Period {
    pub const ALL: [Period; 3] = [Period(1), Period(2), Period(3)];

    pub fn new(number: u8) -> Option<Self> {
        (1..=3).contains(&number).then_some(Period(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based offset from the first period row
    pub fn offset(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Period {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Period::new(value).ok_or_else(|| format!("period must be 1, 2 or 3, got {}", value))
    }
}

impl From<Period> for u8 {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lesson taking place on the processed date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lesson {
    pub code: LessonCode,
    pub period: Period,
    pub grade_number: u8,
    pub subject: Subject,
    pub grade_name: String,
    pub subject_name: String,
    /// Template cell the lesson was read from
    pub source_row: usize,
    pub source_col: usize,
    pub assigned_teacher: Option<String>,
    #[serde(skip)]
    pub style: Option<StyleSnapshot>,
}

impl Lesson {
    /// Scheduling priority: higher grades, core subjects and earlier periods go first
    pub fn priority_score(&self) -> u32 {
        u32::from(self.grade_number) * 10 + self.subject.weight() + (4 - u32::from(self.period.number())) * 2
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_teacher.is_some()
    }
}

/// Teachers already committed in each period during one run
#[derive(Debug, Clone, Default)]
pub struct AssignmentState {
    by_period: HashMap<Period, HashSet<String>>,
}

impl AssignmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assigned(&self, period: Period, teacher: &str) -> bool {
        self.by_period
            .get(&period)
            .is_some_and(|teachers| teachers.contains(teacher))
    }

    pub fn commit(&mut self, period: Period, teacher: &str) {
        self.by_period.entry(period).or_default().insert(teacher.to_string());
    }

    /// Number of teachers committed in a period
    pub fn count(&self, period: Period) -> usize {
        self.by_period.get(&period).map_or(0, HashSet::len)
    }
}
