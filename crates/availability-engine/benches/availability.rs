use availability_engine::{compute_availability, TimeInterval};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Four one-hour meetings a day for a month, in UTC.
fn month_of_meetings() -> Vec<TimeInterval> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..31)
        .flat_map(|day| [9, 11, 14, 16].map(move |hour| (day, hour)))
        .map(|(day, hour)| {
            let start = base + Duration::days(day) + Duration::hours(hour);
            TimeInterval::new(start.fixed_offset(), (start + Duration::hours(1)).fixed_offset())
                .with_label("Meeting")
        })
        .collect()
}

fn bench_compute(c: &mut Criterion) {
    let intervals = month_of_meetings();
    let first = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

    c.bench_function("month_of_meetings_los_angeles", |b| {
        b.iter(|| {
            compute_availability(
                black_box(first),
                black_box(last),
                black_box(&intervals),
                "America/Los_Angeles",
            )
        })
    });

    c.bench_function("empty_year_utc", |b| {
        let year_end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        b.iter(|| compute_availability(black_box(first), black_box(year_end), &[], "UTC"))
    });
}

criterion_group!(benches, bench_compute);
criterion_main!(benches);
