use chrono::{Datelike, Days, Months, NaiveDate};
use std::iter::FusedIterator;
use tracing::{debug, warn};

use super::calendar::{clamped_date, nth_weekday_of_month, week_start};
use super::rule::{
    Limit, MonthlyAnchor, Pattern, Preset, RecurrenceRule, WeekdaySet, WeeklyAnchor, YearlyAnchor,
};

/// Hard ceiling, in days, on the start-date search.
pub const MAX_SNAP_DAYS: usize = 1000;

/// One computed occurrence of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    /// The date the rule produced, before weekend adjustment. This is the
    /// basis for computing the following occurrence.
    pub scheduled: NaiveDate,
    /// The date the occurrence is actually due, after weekend adjustment.
    pub due: NaiveDate,
}

impl Occurrence {
    pub fn was_adjusted(&self) -> bool {
        self.scheduled != self.due
    }
}

/// Computes the occurrence following `previous`.
///
/// `previous` is the unadjusted date of the prior occurrence, or the
/// completion date for completion-based rules. `occurrence_index` is the
/// number of occurrences already produced under `rule`; once it reaches the
/// rule's count the recurrence is over.
///
/// Returns `None` when the recurrence has ended.
pub fn compute_next_occurrence(
    rule: &RecurrenceRule,
    previous: NaiveDate,
    occurrence_index: u32,
) -> Option<Occurrence> {
    if let Limit::Count(max) = rule.limit() {
        if occurrence_index >= max {
            debug!(occurrence_index, max, "recurrence count exhausted");
            return None;
        }
    }

    let mut scheduled = advance(rule.pattern(), rule.interval(), previous)?;

    if let Some(start) = rule.start_date() {
        if scheduled < start {
            scheduled = snap_to_anchor(rule, previous, start)?;
        }
    }

    let due = rule.on_weekend().adjust(scheduled)?;

    if let Limit::Until(end) = rule.limit() {
        if due >= end {
            debug!(%due, %end, "recurrence passed its end date");
            return None;
        }
    }

    debug!(%previous, %scheduled, %due, occurrence_index, "computed next occurrence");
    Some(Occurrence { scheduled, due })
}

/// True for the plain daily/weekly/monthly/yearly presets and for no rule at all.
pub fn is_default_rule(rule: Option<&RecurrenceRule>) -> bool {
    Preset::classify(rule).is_some()
}

/// Steps one interval forward from `previous` according to the pattern's anchor.
fn advance(pattern: &Pattern, interval: u32, previous: NaiveDate) -> Option<NaiveDate> {
    let interval_days = u64::from(interval);

    match *pattern {
        Pattern::Daily => previous.checked_add_days(Days::new(interval_days)),
        Pattern::Weekly(WeeklyAnchor::SameWeekday) => {
            previous.checked_add_days(Days::new(7 * interval_days))
        }
        Pattern::Weekly(WeeklyAnchor::Days(days)) => next_listed_weekday(days, interval, previous),
        Pattern::Monthly(anchor) => {
            let target = previous
                .with_day(1)?
                .checked_add_months(Months::new(interval))?;
            let (year, month) = (target.year(), target.month());
            match anchor {
                MonthlyAnchor::SameDay => clamped_date(year, month, previous.day()),
                MonthlyAnchor::DayOfMonth(day) => clamped_date(year, month, day.into()),
                MonthlyAnchor::WeekdayOfMonth { week, weekday } => {
                    nth_weekday_of_month(year, month, week, weekday)
                }
            }
        }
        Pattern::Yearly(anchor) => {
            let year = previous.year().checked_add(i32::try_from(interval).ok()?)?;
            match anchor {
                YearlyAnchor::SameDate => clamped_date(year, previous.month(), previous.day()),
                YearlyAnchor::Date { month, day } => {
                    clamped_date(year, month.number_from_month(), day.into())
                }
            }
        }
    }
}

/// Next listed weekday after `previous` in its own Sunday-based week, or the
/// first listed weekday of the week `interval` weeks later.
fn next_listed_weekday(days: WeekdaySet, interval: u32, previous: NaiveDate) -> Option<NaiveDate> {
    let offset = previous.weekday().num_days_from_sunday();

    if let Some(later) = days.iter().find(|d| d.num_days_from_sunday() > offset) {
        let gap = later.num_days_from_sunday() - offset;
        return previous.checked_add_days(Days::new(gap.into()));
    }

    let block = week_start(previous)?.checked_add_days(Days::new(7 * u64::from(interval)))?;
    let first = days.first()?;
    block.checked_add_days(Days::new(first.num_days_from_sunday().into()))
}

/// Whether `candidate` satisfies the pattern's anchor, judged against the
/// previous occurrence for the "same as previous" anchors.
fn matches_anchor(pattern: &Pattern, previous: NaiveDate, candidate: NaiveDate) -> bool {
    let (year, month) = (candidate.year(), candidate.month());

    let expected = match *pattern {
        Pattern::Daily => return true,
        Pattern::Weekly(WeeklyAnchor::SameWeekday) => {
            return candidate.weekday() == previous.weekday()
        }
        Pattern::Weekly(WeeklyAnchor::Days(days)) => return days.contains(candidate.weekday()),
        Pattern::Monthly(MonthlyAnchor::SameDay) => clamped_date(year, month, previous.day()),
        Pattern::Monthly(MonthlyAnchor::DayOfMonth(day)) => clamped_date(year, month, day.into()),
        Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth { week, weekday }) => {
            nth_weekday_of_month(year, month, week, weekday)
        }
        Pattern::Yearly(YearlyAnchor::SameDate) => {
            clamped_date(year, previous.month(), previous.day())
        }
        Pattern::Yearly(YearlyAnchor::Date { month: target, day }) => {
            clamped_date(year, target.number_from_month(), day.into())
        }
    };

    expected == Some(candidate)
}

/// Days searched past the start date: twice the interval's span.
fn search_span(rule: &RecurrenceRule) -> usize {
    let unit_days: usize = match rule.pattern() {
        Pattern::Daily => 1,
        Pattern::Weekly(_) => 7,
        Pattern::Monthly(_) => 31,
        Pattern::Yearly(_) => 366,
    };
    let interval = usize::try_from(rule.interval()).unwrap_or(usize::MAX);
    unit_days.saturating_mul(interval).saturating_mul(2)
}

/// The first anchor-satisfying date on or after `start`, within a bounded search.
fn snap_to_anchor(rule: &RecurrenceRule, previous: NaiveDate, start: NaiveDate) -> Option<NaiveDate> {
    let limit = search_span(rule).min(MAX_SNAP_DAYS);
    let found = start
        .iter_days()
        .take(limit)
        .find(|candidate| matches_anchor(rule.pattern(), previous, *candidate));

    if found.is_none() {
        warn!(%start, limit, rule = %rule, "no date satisfies the rule anchor after its start date");
    }
    found
}

impl RecurrenceRule {
    /// Shorthand for [`compute_next_occurrence`].
    pub fn next_occurrence(&self, previous: NaiveDate, occurrence_index: u32) -> Option<Occurrence> {
        compute_next_occurrence(self, previous, occurrence_index)
    }

    /// All occurrences following `basis`, with nothing produced yet.
    pub fn occurrences_after(&self, basis: NaiveDate) -> Occurrences<'_> {
        Occurrences::new(self, basis, 0)
    }
}

/// Iterator over successive occurrences of a rule. Each step feeds the
/// unadjusted date back in as the next basis so weekend shifts never
/// accumulate.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    basis: NaiveDate,
    index: u32,
    finished: bool,
}

impl<'a> Occurrences<'a> {
    pub fn new(rule: &'a RecurrenceRule, basis: NaiveDate, already_produced: u32) -> Self {
        Self {
            rule,
            basis,
            index: already_produced,
            finished: false,
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match compute_next_occurrence(self.rule, self.basis, self.index) {
            Some(occurrence) => {
                self.basis = occurrence.scheduled;
                self.index = self.index.saturating_add(1);
                Some(occurrence)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl FusedIterator for Occurrences<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{WeekOfMonth, WeekendPolicy};
    use chrono::{Month, Weekday};
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn due(rule: &RecurrenceRule, previous: NaiveDate) -> Option<NaiveDate> {
        compute_next_occurrence(rule, previous, 0).map(|o| o.due)
    }

    fn weekly_on(days: &[Weekday], interval: u32) -> RecurrenceRule {
        RecurrenceRule::builder(Pattern::Weekly(WeeklyAnchor::Days(
            days.iter().copied().collect(),
        )))
        .every(interval)
        .build()
        .unwrap()
    }

    mod daily {
        use super::*;

        #[rstest]
        #[case(1, date(2025, 2, 28), date(2025, 3, 1))]
        #[case(3, date(2024, 2, 27), date(2024, 3, 1))]
        #[case(10, date(2025, 12, 25), date(2026, 1, 4))]
        fn test_adds_interval_days(
            #[case] interval: u32,
            #[case] previous: NaiveDate,
            #[case] expected: NaiveDate,
        ) {
            let rule = RecurrenceRule::builder(Pattern::Daily).every(interval).build().unwrap();
            assert_eq!(due(&rule, previous), Some(expected));
        }
    }

    mod weekly {
        use super::*;

        #[test]
        fn test_same_weekday() {
            let rule = RecurrenceRule::weekly().to_builder().every(2).build().unwrap();
            // Thursday to Thursday two weeks later.
            assert_eq!(due(&rule, date(2025, 1, 2)), Some(date(2025, 1, 16)));
        }

        #[test]
        fn test_wednesday_rolls_to_next_monday() {
            let rule = weekly_on(&[Weekday::Mon, Weekday::Wed], 1);
            // 2025-01-15 is a Wednesday.
            assert_eq!(due(&rule, date(2025, 1, 15)), Some(date(2025, 1, 20)));
        }

        #[test]
        fn test_later_day_in_same_week() {
            let rule = weekly_on(&[Weekday::Mon, Weekday::Wed], 1);
            assert_eq!(due(&rule, date(2025, 1, 13)), Some(date(2025, 1, 15)));
        }

        #[test]
        fn test_interval_skips_whole_weeks() {
            let rule = weekly_on(&[Weekday::Mon, Weekday::Fri], 3);
            // Friday 2025-01-17: week of Sunday 01-12, plus three weeks is 02-02.
            assert_eq!(due(&rule, date(2025, 1, 17)), Some(date(2025, 2, 3)));
            // Monday stays inside the current week.
            assert_eq!(due(&rule, date(2025, 1, 13)), Some(date(2025, 1, 17)));
        }

        #[test]
        fn test_sunday_and_saturday_members() {
            let rule = weekly_on(&[Weekday::Sun, Weekday::Sat], 1);
            assert_eq!(due(&rule, date(2025, 1, 12)), Some(date(2025, 1, 18)));
            assert_eq!(due(&rule, date(2025, 1, 18)), Some(date(2025, 1, 19)));
        }

        #[test]
        fn test_previous_not_in_set() {
            let rule = weekly_on(&[Weekday::Tue], 2);
            // Wednesday 2025-01-15: no Tuesday left, jump two weeks from Sunday 01-12.
            assert_eq!(due(&rule, date(2025, 1, 15)), Some(date(2025, 1, 28)));
            // Monday 2025-01-13: Tuesday still ahead this week.
            assert_eq!(due(&rule, date(2025, 1, 13)), Some(date(2025, 1, 14)));
        }
    }

    mod monthly {
        use super::*;

        #[rstest]
        #[case(date(2025, 1, 31), date(2025, 2, 28))]
        #[case(date(2024, 1, 31), date(2024, 2, 29))]
        #[case(date(2025, 3, 31), date(2025, 4, 30))]
        #[case(date(2025, 12, 15), date(2026, 1, 15))]
        fn test_same_day_clamps(#[case] previous: NaiveDate, #[case] expected: NaiveDate) {
            assert_eq!(due(&RecurrenceRule::monthly(), previous), Some(expected));
        }

        #[rstest]
        #[case(date(2025, 1, 31), date(2025, 2, 28))]
        #[case(date(2024, 1, 31), date(2024, 2, 29))]
        #[case(date(2025, 2, 28), date(2025, 3, 31))]
        fn test_day_31_clamps_without_drift(
            #[case] previous: NaiveDate,
            #[case] expected: NaiveDate,
        ) {
            let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::DayOfMonth(31)))
                .build()
                .unwrap();
            assert_eq!(due(&rule, previous), Some(expected));
        }

        #[test]
        fn test_interval_crosses_year() {
            let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::DayOfMonth(10)))
                .every(3)
                .build()
                .unwrap();
            assert_eq!(due(&rule, date(2025, 11, 20)), Some(date(2026, 2, 10)));
        }

        #[test]
        fn test_last_friday_with_four_fridays() {
            let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth {
                week: WeekOfMonth::Last,
                weekday: Weekday::Fri,
            }))
            .build()
            .unwrap();
            // February 2025 has four Fridays.
            assert_eq!(due(&rule, date(2025, 1, 31)), Some(date(2025, 2, 28)));
            // May 2025 has five.
            assert_eq!(due(&rule, date(2025, 4, 25)), Some(date(2025, 5, 30)));
        }

        #[test]
        fn test_second_tuesday() {
            let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth {
                week: WeekOfMonth::Second,
                weekday: Weekday::Tue,
            }))
            .build()
            .unwrap();
            assert_eq!(due(&rule, date(2025, 2, 11)), Some(date(2025, 3, 11)));
        }
    }

    mod yearly {
        use super::*;

        #[test]
        fn test_leap_day_clamps() {
            let rule = RecurrenceRule::builder(Pattern::Yearly(YearlyAnchor::Date {
                month: Month::February,
                day: 29,
            }))
            .build()
            .unwrap();
            assert_eq!(due(&rule, date(2024, 2, 29)), Some(date(2025, 2, 28)));
            assert_eq!(due(&rule, date(2027, 2, 28)), Some(date(2028, 2, 29)));
        }

        #[test]
        fn test_same_date_clamps() {
            assert_eq!(due(&RecurrenceRule::yearly(), date(2024, 2, 29)), Some(date(2025, 2, 28)));
            assert_eq!(due(&RecurrenceRule::yearly(), date(2025, 7, 4)), Some(date(2026, 7, 4)));
        }

        #[test]
        fn test_explicit_date_with_interval() {
            let rule = RecurrenceRule::builder(Pattern::Yearly(YearlyAnchor::Date {
                month: Month::September,
                day: 1,
            }))
            .every(2)
            .build()
            .unwrap();
            assert_eq!(due(&rule, date(2025, 3, 15)), Some(date(2027, 9, 1)));
        }
    }

    mod weekend {
        use super::*;

        #[test]
        fn test_nearest_weekday_shifts() {
            let rule = RecurrenceRule::daily()
                .to_builder()
                .on_weekend(WeekendPolicy::NearestWeekday)
                .build()
                .unwrap();
            // Friday 03-07 -> Saturday 03-08 -> Friday.
            let saturday = compute_next_occurrence(&rule, date(2025, 3, 7), 0).unwrap();
            assert_eq!(saturday.scheduled, date(2025, 3, 8));
            assert_eq!(saturday.due, date(2025, 3, 7));
            assert!(saturday.was_adjusted());

            let sunday = compute_next_occurrence(&rule, saturday.scheduled, 1).unwrap();
            assert_eq!(sunday.scheduled, date(2025, 3, 9));
            assert_eq!(sunday.due, date(2025, 3, 10));
        }

        #[test]
        fn test_no_drift_across_occurrences() {
            let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::DayOfMonth(1)))
                .on_weekend(WeekendPolicy::NextWeekday)
                .build()
                .unwrap();
            let occurrences: Vec<_> = rule.occurrences_after(date(2025, 1, 1)).take(10).collect();

            for (i, occurrence) in occurrences.iter().enumerate() {
                let month = 2 + i as u32;
                assert_eq!(occurrence.scheduled, date(2025, month, 1));
                assert!(occurrence.due.day() <= 3);
            }
            // 2025-03-01 is a Saturday, 2025-06-01 a Sunday.
            assert_eq!(occurrences[1].due, date(2025, 3, 3));
            assert_eq!(occurrences[4].due, date(2025, 6, 2));
        }
    }

    mod bounds {
        use super::*;

        #[test]
        fn test_max_count() {
            let rule = RecurrenceRule::daily().to_builder().count(3).build().unwrap();
            let previous = date(2025, 1, 1);
            assert!(compute_next_occurrence(&rule, previous, 0).is_some());
            assert!(compute_next_occurrence(&rule, previous, 1).is_some());
            assert!(compute_next_occurrence(&rule, previous, 2).is_some());
            assert_eq!(compute_next_occurrence(&rule, previous, 3), None);
            assert_eq!(compute_next_occurrence(&rule, previous, 40), None);
        }

        #[test]
        fn test_end_date_is_exclusive() {
            let rule = RecurrenceRule::daily()
                .to_builder()
                .until(date(2025, 1, 10))
                .build()
                .unwrap();
            assert_eq!(due(&rule, date(2025, 1, 8)), Some(date(2025, 1, 9)));
            assert_eq!(due(&rule, date(2025, 1, 9)), None);
        }

        #[test]
        fn test_end_date_checked_after_weekend_adjustment() {
            // Sunday 2025-03-09 would move to Monday 03-10, which is the end date.
            let rule = RecurrenceRule::daily()
                .to_builder()
                .on_weekend(WeekendPolicy::NextWeekday)
                .until(date(2025, 3, 10))
                .build()
                .unwrap();
            assert_eq!(due(&rule, date(2025, 3, 8)), None);
        }

        #[test]
        fn test_start_date_snaps_to_anchor() {
            let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::DayOfMonth(15)))
                .starting(date(2025, 6, 20))
                .build()
                .unwrap();
            // The plain computation gives 2025-02-15, before the start.
            assert_eq!(due(&rule, date(2025, 1, 15)), Some(date(2025, 7, 15)));
        }

        #[test]
        fn test_start_date_snaps_weekly_days() {
            let rule = RecurrenceRule::builder(Pattern::Weekly(WeeklyAnchor::Days(
                WeekdaySet::single(Weekday::Thu),
            )))
            .starting(date(2025, 3, 1))
            .build()
            .unwrap();
            assert_eq!(due(&rule, date(2025, 1, 2)), Some(date(2025, 3, 6)));
        }

        #[test]
        fn test_start_date_daily_uses_start() {
            let rule = RecurrenceRule::daily()
                .to_builder()
                .every(4)
                .starting(date(2025, 5, 1))
                .build()
                .unwrap();
            assert_eq!(due(&rule, date(2025, 1, 1)), Some(date(2025, 5, 1)));
        }

        #[test]
        fn test_start_date_ignored_once_passed() {
            let rule = RecurrenceRule::daily()
                .to_builder()
                .starting(date(2025, 1, 1))
                .build()
                .unwrap();
            assert_eq!(due(&rule, date(2025, 2, 1)), Some(date(2025, 2, 2)));
        }

        #[test]
        fn test_start_search_is_bounded() {
            // Every day: the search covers two days past the start.
            let rule = RecurrenceRule::daily()
                .to_builder()
                .starting(date(2025, 5, 1))
                .build()
                .unwrap();
            assert_eq!(search_span(&rule), 2);

            let rule = RecurrenceRule::yearly().to_builder().every(5).build().unwrap();
            assert_eq!(search_span(&rule).min(MAX_SNAP_DAYS), MAX_SNAP_DAYS);
        }

        #[test]
        fn test_exhausted_start_search_ends_recurrence() {
            // Only the last ten days of the calendar remain, none of them a 15th.
            let start = NaiveDate::MAX.checked_sub_days(Days::new(10)).unwrap();
            let rule = RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::DayOfMonth(15)))
                .starting(start)
                .build()
                .unwrap();
            assert_eq!(compute_next_occurrence(&rule, date(2025, 1, 15), 0), None);
        }

        #[test]
        fn test_end_of_calendar_terminates() {
            assert_eq!(due(&RecurrenceRule::daily(), NaiveDate::MAX), None);
        }

        #[test]
        fn test_huge_yearly_interval_from_december_terminates() {
            let interval = u32::try_from(i32::MAX - 2025).unwrap();
            let rule = RecurrenceRule::yearly().to_builder().every(interval).build().unwrap();
            assert_eq!(due(&rule, date(2025, 12, 15)), None);
            assert_eq!(due(&rule, date(2025, 6, 15)), None);
        }
    }

    mod iteration {
        use super::*;

        #[test]
        fn test_occurrences_stop_at_count() {
            let rule = RecurrenceRule::weekly().to_builder().count(4).build().unwrap();
            let dates: Vec<_> = rule.occurrences_after(date(2025, 1, 6)).map(|o| o.due).collect();
            assert_eq!(
                dates,
                vec![date(2025, 1, 13), date(2025, 1, 20), date(2025, 1, 27), date(2025, 2, 3)]
            );
        }

        #[test]
        fn test_occurrences_resume_from_index() {
            let rule = RecurrenceRule::daily().to_builder().count(3).build().unwrap();
            let remaining = Occurrences::new(&rule, date(2025, 1, 1), 2).count();
            assert_eq!(remaining, 1);
        }

        #[test]
        fn test_is_default_rule() {
            assert!(is_default_rule(None));
            assert!(is_default_rule(Some(&RecurrenceRule::monthly())));
            assert!(!is_default_rule(Some(&weekly_on(&[Weekday::Mon], 1))));
        }
    }
}
