use thiserror::Error;

use crate::recurrence::IntervalUnit;

/// A recurrence rule with contradictory or out-of-range fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Interval length must be at least 1")]
    ZeroInterval,

    #[error("A recurrence cannot have both an end date and a maximum count")]
    ConflictingBounds,

    #[error("Maximum count must be at least 1")]
    ZeroCount,

    #[error("Day of month {0} is outside 1-31")]
    DayOfMonthOutOfRange(u8),

    #[error("Week number {0} is outside 1-5")]
    WeekNumberOutOfRange(u8),

    #[error("Month {0} is outside 0-11")]
    MonthOutOfRange(u8),

    #[error("Weekday {0} is outside 0-6")]
    WeekdayOutOfRange(u8),

    #[error("A weekly recurrence on explicit days needs at least one weekday")]
    EmptyWeekdaySet,

    #[error("A week-of-month recurrence needs exactly one weekday, got {0}")]
    WeekdayCount(usize),

    #[error("'{field}' is not valid for a {unit} recurrence")]
    UnexpectedField { unit: IntervalUnit, field: &'static str },

    #[error("'{field}' is required for this {unit} recurrence")]
    MissingField { unit: IntervalUnit, field: &'static str },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid recurrence: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Name)

    #[error("Task '{0}' is already {1}")]
    AlreadyClosed(String, String),
}
