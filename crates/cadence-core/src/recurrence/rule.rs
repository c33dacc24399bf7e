use chrono::{Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::calendar::{WeekendPolicy, WEEK};
use super::record::RuleRecord;
use crate::error::RuleError;

/// The unit a rule repeats in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Day,
    Week,
    Month,
    Year,
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalUnit::Day => write!(f, "day"),
            IntervalUnit::Week => write!(f, "week"),
            IntervalUnit::Month => write!(f, "month"),
            IntervalUnit::Year => write!(f, "year"),
        }
    }
}

/// A compact set of weekdays.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn single(weekday: Weekday) -> Self {
        let mut set = Self::EMPTY;
        set.insert(weekday);
        set
    }

    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_sunday();
    }

    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_sunday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in Sunday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        WEEK.into_iter().filter(move |day| self.contains(*day))
    }

    /// Earliest member counted from Sunday.
    pub fn first(self) -> Option<Weekday> {
        self.iter().next()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Which occurrence of a weekday inside a month. `Last` is week number 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    /// 1 through 5.
    pub fn ordinal(self) -> u8 {
        match self {
            WeekOfMonth::First => 1,
            WeekOfMonth::Second => 2,
            WeekOfMonth::Third => 3,
            WeekOfMonth::Fourth => 4,
            WeekOfMonth::Last => 5,
        }
    }
}

impl TryFrom<u8> for WeekOfMonth {
    type Error = RuleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WeekOfMonth::First),
            2 => Ok(WeekOfMonth::Second),
            3 => Ok(WeekOfMonth::Third),
            4 => Ok(WeekOfMonth::Fourth),
            5 => Ok(WeekOfMonth::Last),
            other => Err(RuleError::WeekNumberOutOfRange(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeeklyAnchor {
    /// Keep the weekday of the previous occurrence.
    SameWeekday,
    /// Cycle through these weekdays.
    Days(WeekdaySet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthlyAnchor {
    /// Keep the day-of-month of the previous occurrence.
    SameDay,
    /// A fixed day, 1-31, clamped to short months.
    DayOfMonth(u8),
    /// "The second Tuesday", "the last Friday".
    WeekdayOfMonth { week: WeekOfMonth, weekday: Weekday },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YearlyAnchor {
    /// Keep the month and day of the previous occurrence.
    SameDate,
    /// A fixed month and day, clamped to the month's length.
    Date { month: Month, day: u8 },
}

/// What a rule repeats and how each occurrence is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Daily,
    Weekly(WeeklyAnchor),
    Monthly(MonthlyAnchor),
    Yearly(YearlyAnchor),
}

impl Pattern {
    pub fn unit(&self) -> IntervalUnit {
        match self {
            Pattern::Daily => IntervalUnit::Day,
            Pattern::Weekly(_) => IntervalUnit::Week,
            Pattern::Monthly(_) => IntervalUnit::Month,
            Pattern::Yearly(_) => IntervalUnit::Year,
        }
    }

    /// True when the pattern just follows the previous occurrence.
    pub fn is_unanchored(&self) -> bool {
        matches!(
            self,
            Pattern::Daily
                | Pattern::Weekly(WeeklyAnchor::SameWeekday)
                | Pattern::Monthly(MonthlyAnchor::SameDay)
                | Pattern::Yearly(YearlyAnchor::SameDate)
        )
    }

    fn validate(&self) -> Result<(), RuleError> {
        match self {
            Pattern::Weekly(WeeklyAnchor::Days(days)) if days.is_empty() => {
                Err(RuleError::EmptyWeekdaySet)
            }
            Pattern::Monthly(MonthlyAnchor::DayOfMonth(day))
            | Pattern::Yearly(YearlyAnchor::Date { day, .. }) => {
                if (1..=31).contains(day) {
                    Ok(())
                } else {
                    Err(RuleError::DayOfMonthOutOfRange(*day))
                }
            }
            _ => Ok(()),
        }
    }
}

/// How a recurrence ends. End date and count are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Limit {
    #[default]
    Never,
    /// No occurrence on or after this date.
    Until(NaiveDate),
    /// At most this many occurrences in total.
    Count(u32),
}

/// A validated, immutable recurrence rule.
///
/// Rules are only built through [`RuleBuilder`]; changing one means building
/// a new value with [`RecurrenceRule::to_builder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord", into = "RuleRecord")]
pub struct RecurrenceRule {
    pattern: Pattern,
    interval: u32,
    start: Option<NaiveDate>,
    limit: Limit,
    on_weekend: WeekendPolicy,
    base_on_completion: bool,
}

impl RecurrenceRule {
    pub fn builder(pattern: Pattern) -> RuleBuilder {
        RuleBuilder::new(pattern)
    }

    fn simple(pattern: Pattern) -> Self {
        Self {
            pattern,
            interval: 1,
            start: None,
            limit: Limit::Never,
            on_weekend: WeekendPolicy::NoChange,
            base_on_completion: false,
        }
    }

    pub fn daily() -> Self {
        Self::simple(Pattern::Daily)
    }

    pub fn weekly() -> Self {
        Self::simple(Pattern::Weekly(WeeklyAnchor::SameWeekday))
    }

    pub fn monthly() -> Self {
        Self::simple(Pattern::Monthly(MonthlyAnchor::SameDay))
    }

    pub fn yearly() -> Self {
        Self::simple(Pattern::Yearly(YearlyAnchor::SameDate))
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn unit(&self) -> IntervalUnit {
        self.pattern.unit()
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.limit {
            Limit::Until(date) => Some(date),
            _ => None,
        }
    }

    pub fn max_count(&self) -> Option<u32> {
        match self.limit {
            Limit::Count(count) => Some(count),
            _ => None,
        }
    }

    pub fn on_weekend(&self) -> WeekendPolicy {
        self.on_weekend
    }

    pub fn base_on_completion(&self) -> bool {
        self.base_on_completion
    }

    /// A builder pre-filled with this rule's fields.
    pub fn to_builder(&self) -> RuleBuilder {
        RuleBuilder {
            pattern: self.pattern,
            interval: self.interval,
            start: self.start,
            until: self.end_date(),
            count: self.max_count(),
            on_weekend: self.on_weekend,
            base_on_completion: self.base_on_completion,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit();
        if self.interval == 1 {
            write!(f, "every {}", unit)?;
        } else {
            write!(f, "every {} {}s", self.interval, unit)?;
        }

        match self.pattern {
            Pattern::Weekly(WeeklyAnchor::Days(days)) => {
                let names: Vec<String> = days.iter().map(|d| d.to_string()).collect();
                write!(f, " on {}", names.join(", "))?;
            }
            Pattern::Monthly(MonthlyAnchor::DayOfMonth(day)) => write!(f, " on day {}", day)?,
            Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth { week, weekday }) => {
                let position = match week {
                    WeekOfMonth::First => "first",
                    WeekOfMonth::Second => "second",
                    WeekOfMonth::Third => "third",
                    WeekOfMonth::Fourth => "fourth",
                    WeekOfMonth::Last => "last",
                };
                write!(f, " on the {} {}", position, weekday)?;
            }
            Pattern::Yearly(YearlyAnchor::Date { month, day }) => {
                write!(f, " on {} {}", &month.name()[..3], day)?;
            }
            _ => {}
        }

        if let Some(start) = self.start {
            write!(f, " starting {}", start)?;
        }
        match self.limit {
            Limit::Never => {}
            Limit::Until(date) => write!(f, " until {}", date)?,
            Limit::Count(1) => write!(f, " once")?,
            Limit::Count(count) => write!(f, " for {} occurrences", count)?,
        }
        if self.on_weekend != WeekendPolicy::NoChange {
            write!(f, ", weekends move to {}", self.on_weekend)?;
        }
        if self.base_on_completion {
            write!(f, ", counted from completion")?;
        }
        Ok(())
    }
}

/// Collects rule fields and validates them all at once in [`RuleBuilder::build`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    pattern: Pattern,
    interval: u32,
    start: Option<NaiveDate>,
    until: Option<NaiveDate>,
    count: Option<u32>,
    on_weekend: WeekendPolicy,
    base_on_completion: bool,
}

impl RuleBuilder {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            interval: 1,
            start: None,
            until: None,
            count: None,
            on_weekend: WeekendPolicy::NoChange,
            base_on_completion: false,
        }
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Repeat every `interval` units.
    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn starting(mut self, start: impl Into<Option<NaiveDate>>) -> Self {
        self.start = start.into();
        self
    }

    pub fn until(mut self, end: impl Into<Option<NaiveDate>>) -> Self {
        self.until = end.into();
        self
    }

    pub fn count(mut self, count: impl Into<Option<u32>>) -> Self {
        self.count = count.into();
        self
    }

    pub fn on_weekend(mut self, policy: WeekendPolicy) -> Self {
        self.on_weekend = policy;
        self
    }

    pub fn base_on_completion(mut self, enabled: bool) -> Self {
        self.base_on_completion = enabled;
        self
    }

    pub fn build(self) -> Result<RecurrenceRule, RuleError> {
        if self.interval == 0 {
            return Err(RuleError::ZeroInterval);
        }
        self.pattern.validate()?;

        let limit = match (self.until, self.count) {
            (Some(_), Some(_)) => return Err(RuleError::ConflictingBounds),
            (_, Some(0)) => return Err(RuleError::ZeroCount),
            (Some(date), None) => Limit::Until(date),
            (None, Some(count)) => Limit::Count(count),
            (None, None) => Limit::Never,
        };

        Ok(RecurrenceRule {
            pattern: self.pattern,
            interval: self.interval,
            start: self.start,
            limit,
            on_weekend: self.on_weekend,
            base_on_completion: self.base_on_completion,
        })
    }
}

/// The simple recurrence choices offered to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Preset {
    /// Matches a (possibly absent) rule against the presets. A rule with any
    /// custom interval, anchor, bound or weekend policy is not a preset.
    /// Completion-based advancement does not affect the classification.
    pub fn classify(rule: Option<&RecurrenceRule>) -> Option<Preset> {
        let Some(rule) = rule else {
            return Some(Preset::None);
        };

        let plain = rule.interval == 1
            && rule.pattern.is_unanchored()
            && rule.start.is_none()
            && rule.limit == Limit::Never
            && rule.on_weekend == WeekendPolicy::NoChange;
        if !plain {
            return None;
        }

        Some(match rule.unit() {
            IntervalUnit::Day => Preset::Daily,
            IntervalUnit::Week => Preset::Weekly,
            IntervalUnit::Month => Preset::Monthly,
            IntervalUnit::Year => Preset::Yearly,
        })
    }

    pub fn rule(self) -> Option<RecurrenceRule> {
        match self {
            Preset::None => None,
            Preset::Daily => Some(RecurrenceRule::daily()),
            Preset::Weekly => Some(RecurrenceRule::weekly()),
            Preset::Monthly => Some(RecurrenceRule::monthly()),
            Preset::Yearly => Some(RecurrenceRule::yearly()),
        }
    }
}
