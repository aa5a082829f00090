//! Criterion benchmarks for aggregation and wide/long conversion.
//!
//! Events are synthetic so runs are deterministic.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lc_core::frame::{wide_to_long, widen};
use lc_core::{CalendarGrid, Cell, EventAggregator, EventFrame, WeekStart};

fn synthetic_events(n: usize, groups: i64) -> EventFrame {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let rows = (0..n)
        .map(|i| {
            // Spread events over four weeks with a fixed stride
            let minutes = (i as i64 * 7919) % (4 * 7 * 24 * 60);
            vec![
                Cell::Int(i as i64 % groups),
                Cell::Timestamp(base + Duration::minutes(minutes)),
                Cell::Float(1.0 + (i % 3) as f64),
            ]
        })
        .collect();
    EventFrame::from_rows(["group", "ts", "weight"], rows).expect("synthetic frame")
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for n in [1_000usize, 10_000] {
        let events = synthetic_events(n, 50);
        let aggregator = EventAggregator::new(CalendarGrid::hourly(), "ts").group_by(["group"]);

        group.bench_with_input(BenchmarkId::new("count", n), &events, |b, ev| {
            b.iter(|| {
                let result = aggregator.count(black_box(ev)).expect("count");
                black_box(result.report.used_rows);
            })
        });

        group.bench_with_input(BenchmarkId::new("sum_weights", n), &events, |b, ev| {
            b.iter(|| {
                let result = aggregator
                    .sum_weights(black_box(ev), "weight")
                    .expect("sum");
                black_box(result.report.used_rows);
            })
        });
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let grid = CalendarGrid::new(15, WeekStart::Monday).expect("grid");
    let wide = EventAggregator::new(grid, "ts")
        .group_by(["group"])
        .count(&synthetic_events(10_000, 200))
        .expect("count")
        .into_wide()
        .expect("wide");

    c.bench_function("wide_long_roundtrip", |b| {
        b.iter(|| {
            let long = wide_to_long(black_box(&wide), WeekStart::Monday);
            black_box(widen(&long).expect("widen"));
        })
    });
}

criterion_group!(benches, bench_aggregate, bench_roundtrip);
criterion_main!(benches);
