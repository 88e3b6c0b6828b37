use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StaffingError;

static LESSON_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("^[1-6][MJRS]$").unwrap());

/// Subjects taught, in descending scheduling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Japanese,
    Science,
    Social,
}

impl Subject {
    pub const ALL: [Subject; 4] = [Subject::Math, Subject::Japanese, Subject::Science, Subject::Social];

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'M' => Some(Subject::Math),
            'J' => Some(Subject::Japanese),
            'R' => Some(Subject::Science),
            'S' => Some(Subject::Social),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Subject::Math => 'M',
            Subject::Japanese => 'J',
            Subject::Science => 'R',
            Subject::Social => 'S',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Subject::Math => "算数",
            Subject::Japanese => "国語",
            Subject::Science => "理科",
            Subject::Social => "社会",
        }
    }

    /// Position in [`Subject::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Weight added to a lesson's priority score; math first, social studies last
    pub fn weight(self) -> u32 {
        match self {
            Subject::Math => 5,
            Subject::Japanese => 4,
            Subject::Science => 3,
            Subject::Social => 2,
        }
    }
}

/// A two-character lesson code such as `3M` (grade 3 math)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LessonCode {
    grade: u8,
    subject: Subject,
}

impl LessonCode {
    /// Every registered code, grade by grade, subjects in weight order
    pub fn all() -> impl Iterator<Item = LessonCode> {
        (1..=6u8).flat_map(|grade| Subject::ALL.into_iter().map(move |subject| LessonCode { grade, subject }))
    }

    pub fn grade(self) -> u8 {
        self.grade
    }

    pub fn subject(self) -> Subject {
        self.subject
    }

    pub fn descriptor(self) -> &'static LessonDescriptor {
        // every constructed code is one of the registered combinations
        &LESSON_CODES[&self]
    }
}

impl FromStr for LessonCode {
    type Err = StaffingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_lesson_code(s) {
            return Err(StaffingError::InvalidLessonCode(s.to_string()));
        }
        let mut chars = s.chars();
        let grade = chars.next().and_then(|c| c.to_digit(10));
        let subject = chars.next().and_then(Subject::from_letter);
        match (grade, subject) {
            (Some(grade), Some(subject)) => Ok(LessonCode {
                grade: grade as u8,
                subject,
            }),
            _ => Err(StaffingError::InvalidLessonCode(s.to_string())),
        }
    }
}

impl TryFrom<String> for LessonCode {
    type Error = StaffingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LessonCode> for String {
    fn from(code: LessonCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for LessonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.grade, self.subject.letter())
    }
}

/// What a lesson code stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonDescriptor {
    pub grade_name: String,
    pub subject_name: &'static str,
    pub grade_number: u8,
    pub subject: Subject,
}

/// The 24 lesson codes the school teaches: grades 1-6 times four subjects
pub static LESSON_CODES: Lazy<HashMap<LessonCode, LessonDescriptor>> = Lazy::new(|| {
    LessonCode::all()
        .map(|code| {
            let descriptor = LessonDescriptor {
                grade_name: format!("小{}", code.grade),
                subject_name: code.subject.name(),
                grade_number: code.grade,
                subject: code.subject,
            };
            (code, descriptor)
        })
        .collect()
});

/// Checks whether a cell value has the shape of a lesson code (e.g. "1M", "6S")
pub fn is_lesson_code(value: &str) -> bool {
    LESSON_CODE_REGEX.is_match(value)
}

/// Resolves a cell value to its code and descriptor, `None` for anything else
pub fn lookup(value: &str) -> Option<(LessonCode, &'static LessonDescriptor)> {
    let code: LessonCode = value.parse().ok()?;
    LESSON_CODES.get(&code).map(|descriptor| (code, descriptor))
}
