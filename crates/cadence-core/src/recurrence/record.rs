//! Flat, serializable form of a [`RecurrenceRule`].
//!
//! Storage and import code deal in this record; the anchor variant is implied
//! by which optional fields are present. Converting back into a rule runs the
//! same validation as [`RuleBuilder::build`](super::RuleBuilder::build), so a
//! malformed record never becomes a rule.

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};

use super::calendar::{weekday_from_sunday, WeekendPolicy};
use super::rule::{
    IntervalUnit, MonthlyAnchor, Pattern, RecurrenceRule, WeekOfMonth, WeekdaySet, WeeklyAnchor,
    YearlyAnchor,
};
use crate::error::RuleError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    pub interval_unit: IntervalUnit,
    #[serde(default = "default_interval")]
    pub interval_length: u32,
    /// 0=Sunday..6=Saturday.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    /// 1-5, where 5 is the last week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u8>,
    /// 0=January..11=December.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
    #[serde(default)]
    pub on_weekend: WeekendPolicy,
    #[serde(default)]
    pub base_on_completion: bool,
}

fn default_interval() -> u32 {
    1
}

impl RuleRecord {
    /// An otherwise empty record for `unit`.
    pub fn new(interval_unit: IntervalUnit) -> Self {
        Self {
            interval_unit,
            interval_length: 1,
            weekdays: Vec::new(),
            day_of_month: None,
            week_number: None,
            month: None,
            start_date: None,
            end_date: None,
            max_count: None,
            on_weekend: WeekendPolicy::NoChange,
            base_on_completion: false,
        }
    }

    fn reject(&self, field: &'static str, present: bool) -> Result<(), RuleError> {
        if present {
            Err(RuleError::UnexpectedField {
                unit: self.interval_unit,
                field,
            })
        } else {
            Ok(())
        }
    }

    fn weekday_set(&self) -> Result<WeekdaySet, RuleError> {
        self.weekdays
            .iter()
            .map(|&n| weekday_from_sunday(n).ok_or(RuleError::WeekdayOutOfRange(n)))
            .collect()
    }

    fn pattern(&self) -> Result<Pattern, RuleError> {
        let unit = self.interval_unit;
        match unit {
            IntervalUnit::Day => {
                self.reject("weekdays", !self.weekdays.is_empty())?;
                self.reject("dayOfMonth", self.day_of_month.is_some())?;
                self.reject("weekNumber", self.week_number.is_some())?;
                self.reject("month", self.month.is_some())?;
                Ok(Pattern::Daily)
            }
            IntervalUnit::Week => {
                self.reject("dayOfMonth", self.day_of_month.is_some())?;
                self.reject("weekNumber", self.week_number.is_some())?;
                self.reject("month", self.month.is_some())?;
                let days = self.weekday_set()?;
                if days.is_empty() {
                    Ok(Pattern::Weekly(WeeklyAnchor::SameWeekday))
                } else {
                    Ok(Pattern::Weekly(WeeklyAnchor::Days(days)))
                }
            }
            IntervalUnit::Month => {
                self.reject("month", self.month.is_some())?;
                match (self.day_of_month, self.week_number) {
                    (Some(_), Some(_)) => Err(RuleError::UnexpectedField {
                        unit,
                        field: "weekNumber",
                    }),
                    (Some(day), None) => {
                        self.reject("weekdays", !self.weekdays.is_empty())?;
                        Ok(Pattern::Monthly(MonthlyAnchor::DayOfMonth(day)))
                    }
                    (None, Some(week)) => {
                        let week = WeekOfMonth::try_from(week)?;
                        let days = self.weekday_set()?;
                        if self.weekdays.len() != 1 {
                            return Err(RuleError::WeekdayCount(self.weekdays.len()));
                        }
                        let weekday = days.first().ok_or(RuleError::WeekdayCount(0))?;
                        Ok(Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth { week, weekday }))
                    }
                    (None, None) => {
                        self.reject("weekdays", !self.weekdays.is_empty())?;
                        Ok(Pattern::Monthly(MonthlyAnchor::SameDay))
                    }
                }
            }
            IntervalUnit::Year => {
                self.reject("weekdays", !self.weekdays.is_empty())?;
                self.reject("weekNumber", self.week_number.is_some())?;
                match (self.month, self.day_of_month) {
                    (Some(month), Some(day)) => {
                        let month = Month::try_from(month.saturating_add(1))
                            .map_err(|_| RuleError::MonthOutOfRange(month))?;
                        Ok(Pattern::Yearly(YearlyAnchor::Date { month, day }))
                    }
                    (Some(_), None) => Err(RuleError::MissingField {
                        unit,
                        field: "dayOfMonth",
                    }),
                    (None, Some(_)) => Err(RuleError::MissingField {
                        unit,
                        field: "month",
                    }),
                    (None, None) => Ok(Pattern::Yearly(YearlyAnchor::SameDate)),
                }
            }
        }
    }
}

impl TryFrom<RuleRecord> for RecurrenceRule {
    type Error = RuleError;

    fn try_from(record: RuleRecord) -> Result<Self, Self::Error> {
        let pattern = record.pattern()?;
        RecurrenceRule::builder(pattern)
            .every(record.interval_length)
            .starting(record.start_date)
            .until(record.end_date)
            .count(record.max_count)
            .on_weekend(record.on_weekend)
            .base_on_completion(record.base_on_completion)
            .build()
    }
}

impl From<RecurrenceRule> for RuleRecord {
    fn from(rule: RecurrenceRule) -> Self {
        let mut record = RuleRecord::new(rule.unit());
        record.interval_length = rule.interval();
        record.start_date = rule.start_date();
        record.end_date = rule.end_date();
        record.max_count = rule.max_count();
        record.on_weekend = rule.on_weekend();
        record.base_on_completion = rule.base_on_completion();

        match *rule.pattern() {
            Pattern::Daily
            | Pattern::Weekly(WeeklyAnchor::SameWeekday)
            | Pattern::Monthly(MonthlyAnchor::SameDay)
            | Pattern::Yearly(YearlyAnchor::SameDate) => {}
            Pattern::Weekly(WeeklyAnchor::Days(days)) => {
                record.weekdays = days.iter().map(sunday_number).collect();
            }
            Pattern::Monthly(MonthlyAnchor::DayOfMonth(day)) => {
                record.day_of_month = Some(day);
            }
            Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth { week, weekday }) => {
                record.week_number = Some(week.ordinal());
                record.weekdays = vec![sunday_number(weekday)];
            }
            Pattern::Yearly(YearlyAnchor::Date { month, day }) => {
                record.month = Some(month.number_from_month() as u8 - 1);
                record.day_of_month = Some(day);
            }
        }
        record
    }
}

fn sunday_number(weekday: chrono::Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}
