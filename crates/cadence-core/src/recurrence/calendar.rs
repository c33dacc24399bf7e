//! Calendar arithmetic used by the recurrence engine.
//!
//! Every policy the engine relies on lives here as a named function so it can
//! be exercised on its own: month-length clamping, "nth weekday of a month"
//! lookup, Sunday-based week blocks and weekend adjustment.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::rule::WeekOfMonth;

/// Weekdays in Sunday-first order; the index is the wire number (0=Sunday).
pub const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Maps 0=Sunday..6=Saturday onto a [`Weekday`].
pub fn weekday_from_sunday(number: u8) -> Option<Weekday> {
    WEEK.get(usize::from(number)).copied()
}

/// Number of days in `month` (1-based) of `year`, or `None` outside the
/// representable calendar.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };

    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first) => first.pred_opt().map(|last| last.day()),
        // December of the last representable year.
        None if month == 12 => NaiveDate::from_ymd_opt(year, 12, 31).map(|_| 31),
        None => None,
    }
}

/// Builds `year-month-day`, clamping `day` to the last day of that month
/// instead of rolling forward into the next one (Feb 31 becomes Feb 28/29).
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(1, days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The `week`-th `weekday` of a month. [`WeekOfMonth::Last`] resolves to the
/// fifth occurrence when the month has one and the fourth otherwise.
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    week: WeekOfMonth,
    weekday: Weekday,
) -> Option<NaiveDate> {
    match week {
        WeekOfMonth::Last => NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
            .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4)),
        week => NaiveDate::from_weekday_of_month_opt(year, month, weekday, week.ordinal()),
    }
}

/// The Sunday that opens the week containing `date`.
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(date.weekday().num_days_from_sunday().into()))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// What to do with an occurrence that lands on a Saturday or Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekendPolicy {
    /// Keep the weekend date.
    #[default]
    NoChange,
    /// Saturday moves back to Friday, Sunday forward to Monday.
    NearestWeekday,
    /// Move back to the preceding Friday.
    PreviousWeekday,
    /// Move forward to the following Monday.
    NextWeekday,
}

impl WeekendPolicy {
    /// Applies the policy to `date`. Weekdays pass through untouched.
    ///
    /// Only `None` at the very edge of the representable calendar.
    pub fn adjust(self, date: NaiveDate) -> Option<NaiveDate> {
        let (back, forward) = match date.weekday() {
            Weekday::Sat => (1, 2),
            Weekday::Sun => (2, 1),
            _ => return Some(date),
        };

        match self {
            WeekendPolicy::NoChange => Some(date),
            WeekendPolicy::PreviousWeekday => date.checked_sub_days(Days::new(back)),
            WeekendPolicy::NextWeekday => date.checked_add_days(Days::new(forward)),
            WeekendPolicy::NearestWeekday if date.weekday() == Weekday::Sat => {
                date.checked_sub_days(Days::new(back))
            }
            WeekendPolicy::NearestWeekday => date.checked_add_days(Days::new(forward)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekendPolicy::NoChange => "no-change",
            WeekendPolicy::NearestWeekday => "nearest-weekday",
            WeekendPolicy::PreviousWeekday => "previous-weekday",
            WeekendPolicy::NextWeekday => "next-weekday",
        }
    }
}

impl std::fmt::Display for WeekendPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WeekendPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no-change" | "none" => Ok(WeekendPolicy::NoChange),
            "nearest-weekday" | "nearest" => Ok(WeekendPolicy::NearestWeekday),
            "previous-weekday" | "previous" => Ok(WeekendPolicy::PreviousWeekday),
            "next-weekday" | "next" => Ok(WeekendPolicy::NextWeekday),
            _ => Err(format!("Invalid weekend policy: {}", s)),
        }
    }
}
