//! Error types for timetable-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid day code: {0}")]
    InvalidDay(String),

    #[error("Invalid section {section_id}: {reason}")]
    InvalidSection { section_id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
