//! Assigns teachers to the lessons of a tutoring school's daily schedules.
//!
//! Lessons come from a weekday template sheet, teachers from each date's
//! roster and a per-lesson priority table. Results are written back onto the
//! date's schedule sheet.

pub mod config;
pub mod display;
pub mod error;
pub mod grid;
pub mod schedule;
pub mod staff;
pub mod staffing;
pub mod workbook;
pub mod writer;
