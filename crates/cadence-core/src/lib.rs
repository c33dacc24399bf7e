//! # Cadence Core Library
//!
//! Recurring-date computation for a task manager, plus the SQLite-backed
//! task store that drives it.
//!
//! ## Core Modules
//!
//! - [`recurrence`]: recurrence rules, calendar policies and the engine that
//!   computes the next occurrence of a task
//! - [`models`]: task records and transfer objects
//! - [`repository`]: data access layer; completing a recurring task
//!   schedules its next instance
//! - [`db`]: database connection and migration management
//! - [`error`]: rule validation and storage errors
//!
//! ## Example Usage
//!
//! ```rust
//! use cadence_core::recurrence::{compute_next_occurrence, MonthlyAnchor, Pattern, RecurrenceRule};
//! use chrono::NaiveDate;
//!
//! let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::DayOfMonth(31)))
//!     .count(12)
//!     .build()
//!     .expect("valid rule");
//!
//! let january = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
//! let next = compute_next_occurrence(&rule, january, 0).unwrap();
//! assert_eq!(next.due, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
