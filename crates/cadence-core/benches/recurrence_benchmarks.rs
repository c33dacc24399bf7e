use cadence_core::recurrence::{
    compute_next_occurrence, MonthlyAnchor, Pattern, RecurrenceRule, RuleRecord, WeekOfMonth,
    WeekdaySet, WeekendPolicy, WeeklyAnchor, YearlyAnchor,
};
use chrono::{Month, NaiveDate, Weekday};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn benchmark_rules() -> Vec<(&'static str, RecurrenceRule)> {
    let weekdays: WeekdaySet = [Weekday::Mon, Weekday::Wed, Weekday::Fri].into_iter().collect();
    vec![
        ("daily", RecurrenceRule::daily()),
        (
            "weekly_days",
            RecurrenceRule::builder(Pattern::Weekly(WeeklyAnchor::Days(weekdays)))
                .every(2)
                .build()
                .unwrap(),
        ),
        (
            "monthly_day_31",
            RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::DayOfMonth(31)))
                .on_weekend(WeekendPolicy::NearestWeekday)
                .build()
                .unwrap(),
        ),
        (
            "monthly_last_friday",
            RecurrenceRule::builder(Pattern::Monthly(MonthlyAnchor::WeekdayOfMonth {
                week: WeekOfMonth::Last,
                weekday: Weekday::Fri,
            }))
            .build()
            .unwrap(),
        ),
        (
            "yearly_feb_29",
            RecurrenceRule::builder(Pattern::Yearly(YearlyAnchor::Date {
                month: Month::February,
                day: 29,
            }))
            .build()
            .unwrap(),
        ),
    ]
}

fn bench_next_occurrence(c: &mut Criterion) {
    let previous = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    let mut group = c.benchmark_group("next_occurrence");

    for (name, rule) in benchmark_rules() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &rule, |b, rule| {
            b.iter(|| compute_next_occurrence(black_box(rule), black_box(previous), black_box(0)))
        });
    }
    group.finish();
}

fn bench_scattered_bases(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(7);
    let bases: Vec<NaiveDate> = (0..256)
        .filter_map(|_| NaiveDate::from_yo_opt(rng.i32(1990..2090), rng.u32(1..=365)))
        .collect();
    let rules = benchmark_rules();

    c.bench_function("scattered_bases", |b| {
        b.iter(|| {
            for (_, rule) in &rules {
                for basis in &bases {
                    black_box(compute_next_occurrence(rule, *basis, 0));
                }
            }
        })
    });
}

fn bench_start_date_snap(c: &mut Criterion) {
    // The start date lies a few years past the basis, forcing the day-by-day search.
    let rule = RecurrenceRule::builder(Pattern::Yearly(YearlyAnchor::Date {
        month: Month::December,
        day: 25,
    }))
    .starting(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
    .build()
    .unwrap();
    let previous = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();

    c.bench_function("start_date_snap", |b| {
        b.iter(|| compute_next_occurrence(black_box(&rule), black_box(previous), black_box(0)))
    });
}

fn bench_occurrence_preview(c: &mut Criterion) {
    let basis = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let mut group = c.benchmark_group("occurrence_preview");

    for count in [7, 30, 365].iter() {
        group.bench_with_input(BenchmarkId::new("daily", count), count, |b, &count| {
            let rule = RecurrenceRule::daily();
            b.iter(|| rule.occurrences_after(black_box(basis)).take(count).count())
        });
    }
    group.finish();
}

fn bench_record_parsing(c: &mut Criterion) {
    let json = r#"{"intervalUnit":"month","intervalLength":2,"weekNumber":5,"weekdays":[5],"maxCount":12,"onWeekend":"next-weekday"}"#;

    c.bench_function("record_parsing", |b| {
        b.iter(|| {
            let record: RuleRecord = serde_json::from_str(black_box(json)).unwrap();
            RecurrenceRule::try_from(record).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_next_occurrence,
    bench_scattered_bases,
    bench_start_date_snap,
    bench_occurrence_preview,
    bench_record_parsing
);
criterion_main!(benches);
