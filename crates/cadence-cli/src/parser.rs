use anyhow::{anyhow, bail, Result};
use cadence_core::recurrence::{
    MonthlyAnchor, Pattern, RecurrenceRule, WeekOfMonth, WeekdaySet, WeekendPolicy, WeeklyAnchor,
    YearlyAnchor,
};
use chrono::{Local, Month, NaiveDate, Weekday};
use chrono_english::{parse_date_string, Dialect};

use crate::cli::{EveryUnit, RuleArgs};

/// Parses an ISO date, falling back to natural language relative to today.
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(date_str, Local::now(), Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", date_str, e))
}

pub fn parse_weekday(input: &str) -> Result<Weekday> {
    input
        .trim()
        .parse::<Weekday>()
        .map_err(|_| anyhow!("Unknown weekday '{}'", input.trim()))
}

/// Comma-separated weekdays, e.g. "mon,wed,fri".
pub fn parse_weekday_list(input: &str) -> Result<WeekdaySet> {
    let days = input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_weekday)
        .collect::<Result<WeekdaySet>>()?;
    if days.is_empty() {
        bail!("At least one weekday is required");
    }
    Ok(days)
}

pub fn parse_week_of_month(input: &str) -> Result<WeekOfMonth> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("last") {
        return Ok(WeekOfMonth::Last);
    }
    let number: u8 = input
        .parse()
        .map_err(|_| anyhow!("Week must be 1-5 or 'last', got '{}'", input))?;
    Ok(WeekOfMonth::try_from(number)?)
}

/// A month name ("march", "mar") or its number (1-12).
pub fn parse_month(input: &str) -> Result<Month> {
    let input = input.trim();
    if let Ok(number) = input.parse::<u8>() {
        return Month::try_from(number).map_err(|_| anyhow!("Month must be 1-12, got {}", number));
    }
    input
        .parse::<Month>()
        .map_err(|_| anyhow!("Unknown month '{}'", input))
}

fn pattern_from_args(unit: EveryUnit, args: &RuleArgs) -> Result<Pattern> {
    let pattern = match unit {
        EveryUnit::Day => {
            if args.on.is_some() || args.day.is_some() || args.week.is_some() || args.month.is_some() {
                bail!("Daily rules take no --on, --day, --week or --month");
            }
            Pattern::Daily
        }
        EveryUnit::Week => {
            if args.day.is_some() || args.week.is_some() || args.month.is_some() {
                bail!("Weekly rules only accept --on for choosing days");
            }
            match &args.on {
                Some(days) => Pattern::Weekly(WeeklyAnchor::Days(parse_weekday_list(days)?)),
                None => Pattern::Weekly(WeeklyAnchor::SameWeekday),
            }
        }
        EveryUnit::Month => {
            if args.on.is_some() || args.month.is_some() {
                bail!("Monthly rules take --day, or --week with --weekday");
            }
            match (args.day, &args.week, &args.weekday) {
                (Some(day), None, _) => Pattern::Monthly(MonthlyAnchor::DayOfMonth(day)),
                (None, Some(week), Some(weekday)) => Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth {
                    week: parse_week_of_month(week)?,
                    weekday: parse_weekday(weekday)?,
                }),
                (None, None, _) => Pattern::Monthly(MonthlyAnchor::SameDay),
                _ => bail!("Use either --day or --week with --weekday"),
            }
        }
        EveryUnit::Year => {
            if args.on.is_some() || args.week.is_some() {
                bail!("Yearly rules take --month with --day");
            }
            match (&args.month, args.day) {
                (Some(month), Some(day)) => Pattern::Yearly(YearlyAnchor::Date {
                    month: parse_month(month)?,
                    day,
                }),
                (None, None) => Pattern::Yearly(YearlyAnchor::SameDate),
                _ => bail!("Yearly rules need both --month and --day"),
            }
        }
    };
    Ok(pattern)
}

/// Builds a rule from command-line flags. Returns `None` when no `--every`
/// was given.
pub fn rule_from_args(args: &RuleArgs, default_on_weekend: WeekendPolicy) -> Result<Option<RecurrenceRule>> {
    let Some(unit) = args.every else {
        return Ok(None);
    };

    let rule = RecurrenceRule::builder(pattern_from_args(unit, args)?)
        .every(args.interval.unwrap_or(1))
        .starting(args.start.as_deref().map(parse_date).transpose()?)
        .until(args.until.as_deref().map(parse_date).transpose()?)
        .count(args.count)
        .on_weekend(args.on_weekend.unwrap_or(default_on_weekend))
        .base_on_completion(args.from_completion)
        .build()?;
    Ok(Some(rule))
}
