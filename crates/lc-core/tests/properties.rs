//! Property-based tests for the aggregation pipeline and model wrapper.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lc_core::frame::{wide_to_long, widen};
use lc_core::model::{LatentCalendar, PretrainedMixture};
use lc_core::{
    aggregate, CalendarGrid, Cell, EventAggregator, EventFrame, GroupKey, WeekStart, WideMatrix,
};
use lc_math::Matrix;
use proptest::prelude::*;

const BIN_WIDTHS: [u32; 5] = [15, 30, 60, 120, 1440];

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn arb_grid() -> impl Strategy<Value = CalendarGrid> {
    (prop::sample::select(BIN_WIDTHS.to_vec()), any::<bool>()).prop_map(|(bin, sunday)| {
        let week_start = if sunday { WeekStart::Sunday } else { WeekStart::Monday };
        CalendarGrid::new(bin, week_start).unwrap()
    })
}

fn arb_wide() -> impl Strategy<Value = WideMatrix<u64>> {
    (arb_grid(), 1usize..4).prop_flat_map(|(grid, rows)| {
        prop::collection::vec(prop::collection::vec(0u64..5, grid.n_slots()), rows)
            .prop_map(move |data| WideMatrix::from_unnamed_rows(grid, data).unwrap())
    })
}

/// (group, minutes since the base Monday) pairs spanning several weeks.
fn arb_events() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..4, 0i64..(3 * 7 * 24 * 60)), 1..60)
}

fn frame_from(events: &[(i64, i64)]) -> EventFrame {
    let rows = events
        .iter()
        .map(|(group, minutes)| {
            vec![
                Cell::Int(*group),
                Cell::Timestamp(base_time() + Duration::minutes(*minutes)),
            ]
        })
        .collect();
    EventFrame::from_rows(["group", "ts"], rows).unwrap()
}

/// Deterministic Fisher-Yates driven by an xorshift seed.
fn shuffled<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut out = items.to_vec();
    let mut state = seed | 1;
    for i in (1..out.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = (state % (i as u64 + 1)) as usize;
        out.swap(i, j);
    }
    out
}

/// (group, minutes, weight) rows with weights spread over many magnitudes,
/// so the summation order would show up in the low bits.
fn arb_weighted_events() -> impl Strategy<Value = Vec<(i64, i64, f64)>> {
    prop::collection::vec(
        (
            0i64..3,
            0i64..(2 * 7 * 24 * 60),
            prop_oneof![0.0f64..1e-6, 0.0f64..1.0, 1e6f64..1e9],
        ),
        1..80,
    )
}

fn weighted_frame_from(events: &[(i64, i64, f64)]) -> EventFrame {
    let rows = events
        .iter()
        .map(|(group, minutes, weight)| {
            vec![
                Cell::Int(*group),
                Cell::Timestamp(base_time() + Duration::minutes(*minutes)),
                Cell::Float(*weight),
            ]
        })
        .collect();
    EventFrame::from_rows(["group", "ts", "weight"], rows).unwrap()
}

proptest! {
    #[test]
    fn wide_long_roundtrip(wide in arb_wide()) {
        let week_start = wide.grid().week_start();
        let long = wide_to_long(&wide, week_start);
        prop_assert_eq!(long.len(), wide.n_rows() * wide.n_cols());
        let back = widen(&long).unwrap();
        prop_assert_eq!(&back, &wide);
        prop_assert_eq!(widen(&wide_to_long(&back, week_start)).unwrap(), back);
    }

    #[test]
    fn wide_to_long_preserves_row_sums(wide in arb_wide()) {
        let other = match wide.grid().week_start() {
            WeekStart::Monday => WeekStart::Sunday,
            WeekStart::Sunday => WeekStart::Monday,
        };
        let long = wide_to_long(&wide, other);
        let expected: u64 = wide.row_sums().iter().sum();
        prop_assert_eq!(long.total(), expected);
        prop_assert_eq!(widen(&long).unwrap(), wide.rebase(other));
    }

    #[test]
    fn aggregation_ignores_row_order(
        events in arb_events(),
        seed in any::<u64>(),
        bin in prop::sample::select(BIN_WIDTHS.to_vec()),
    ) {
        let reordered = shuffled(&events, seed);

        let a = aggregate(&frame_from(&events), &["group"], "ts", bin, WeekStart::Monday, true)
            .unwrap();
        let b = aggregate(&frame_from(&reordered), &["group"], "ts", bin, WeekStart::Monday, true)
            .unwrap();
        prop_assert_eq!(&a.report, &b.report);
        prop_assert_eq!(a.into_wide().unwrap(), b.into_wide().unwrap());
    }

    #[test]
    fn weighted_sums_ignore_row_order(
        events in arb_weighted_events(),
        seed in any::<u64>(),
        bin in prop::sample::select(BIN_WIDTHS.to_vec()),
    ) {
        let grid = CalendarGrid::new(bin, WeekStart::Monday).unwrap();
        let aggregator = EventAggregator::new(grid, "ts").group_by(["group"]);
        let a = aggregator
            .sum_weights(&weighted_frame_from(&events), "weight")
            .unwrap()
            .into_wide()
            .unwrap();
        let b = aggregator
            .sum_weights(&weighted_frame_from(&shuffled(&events, seed)), "weight")
            .unwrap()
            .into_wide()
            .unwrap();
        prop_assert_eq!(a.groups(), b.groups());
        // Bit-identical, not merely close
        let bits = |w: &WideMatrix<f64>| w.as_slice().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        prop_assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn aggregated_rows_sum_to_event_counts(events in arb_events()) {
        let wide = aggregate(&frame_from(&events), &["group"], "ts", 60, WeekStart::Monday, true)
            .unwrap()
            .into_wide()
            .unwrap();
        for (key, total) in wide.groups().iter().zip(wide.row_sums()) {
            let expected = events
                .iter()
                .filter(|(g, _)| GroupKey::single(*g) == *key)
                .count() as u64;
            prop_assert_eq!(total, expected);
        }
    }

    #[test]
    fn predict_rows_are_distributions(
        weights in prop::collection::vec(prop::collection::vec(0.01f64..10.0, 168), 1..4),
        counts in prop::collection::vec(prop::collection::vec(0u64..3, 168), 1..4),
    ) {
        let grid = CalendarGrid::hourly();
        let components = Matrix::from_rows(weights).unwrap();
        let docs = WideMatrix::from_unnamed_rows(grid, counts).unwrap();
        let mut model = LatentCalendar::new(PretrainedMixture::new(components), grid);
        model.fit(&docs).unwrap();

        for row in model.normalized_components().unwrap().iter_rows() {
            prop_assert!(lc_math::is_distribution(row, 1e-9));
        }
        prop_assert!(lc_math::is_distribution(&model.component_distribution().unwrap(), 1e-9));

        let predicted = model.predict(&docs).unwrap();
        for (_, row) in predicted.iter_rows() {
            prop_assert!(lc_math::is_distribution(row, 1e-9));
        }
    }

    #[test]
    fn vocab_tokens_roundtrip(grid in arb_grid(), index in 0usize..10_080) {
        let index = index % grid.n_slots();
        let slot = grid.slot_at(index).unwrap();
        let token = grid.token_for(slot);
        prop_assert_eq!(grid.slot_for(&token).unwrap(), slot);
        prop_assert_eq!(grid.index_of_token(&token).unwrap(), index);
    }
}
