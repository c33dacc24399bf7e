//! Recurrence rules and next-occurrence computation.
//!
//! - [`rule`]: the validated rule model and its builder
//! - [`calendar`]: clamping, nth-weekday and weekend policies
//! - [`engine`]: [`compute_next_occurrence`] and [`is_default_rule`]
//! - [`record`]: the flat serialized form used by storage

pub mod calendar;
pub mod engine;
pub mod record;
pub mod rule;

pub use calendar::WeekendPolicy;
pub use engine::{compute_next_occurrence, is_default_rule, Occurrence, Occurrences};
pub use record::RuleRecord;
pub use rule::{
    IntervalUnit, Limit, MonthlyAnchor, Pattern, Preset, RecurrenceRule, RuleBuilder,
    WeekOfMonth, WeekdaySet, WeeklyAnchor, YearlyAnchor,
};
