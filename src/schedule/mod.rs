pub mod types;
pub mod registry;
pub mod extract;
pub mod priority;
pub mod availability;
pub mod assign;

pub use types::{AssignmentState, Lesson, Period};
pub use registry::{LessonCode, LessonDescriptor, Subject};
pub use extract::extract_lessons;
pub use priority::{priority_list, register_candidate};
pub use availability::{is_available, Roster};
pub use assign::assign_teachers;
