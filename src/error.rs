//! The error type shared by every part of the dashboard.

use crate::models::Year;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User '{user}' may only view {allowed} data, not {requested}")]
    Forbidden {
        user: String,
        allowed: String,
        requested: Year,
    },

    #[error("A year must be selected for this account (SE, TE or BE)")]
    YearRequired,

    #[error("Required data missing: {0}")]
    MissingTable(String),

    #[error("No column matching '{pattern}' in the {table} table")]
    MissingColumn { table: String, pattern: String },

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid lecture day '{0}', expected Mon to Fri")]
    InvalidDay(String),

    #[error("Invalid year '{0}', expected SE, TE or BE")]
    InvalidYear(String),

    #[error("Invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Lecture '{subject}' must start before it ends ({start} >= {end})")]
    InvalidSlot {
        subject: String,
        start: String,
        end: String,
    },

    #[error("Lecture '{subject}' overlaps with '{existing}'")]
    OverlappingSlot { subject: String, existing: String },

    #[error("Row {line} of the {table} table: {message}")]
    InvalidRow {
        table: String,
        line: u64,
        message: String,
    },

    #[error("Roll number '{0}' already exists")]
    DuplicateRoll(String),

    #[error("No attendance records for roll number '{0}'")]
    UnknownStudent(String),

    #[error("No lectures matched the check-ins of roll number '{0}'")]
    NoLecturesMatched(String),

    #[error("Subject '{0}' is not on the timetable")]
    UnknownSubject(String),

    #[error("A live window of {0} minutes reaches outside the calendar")]
    InvalidWindow(i64),

    #[error("Attendance is stored per day; choose a month to report on")]
    MonthRequired,

    #[error("Invalid store path '{0}'")]
    InvalidPath(String),

    #[error("Failed to write '{path}': {source}")]
    StoreWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
