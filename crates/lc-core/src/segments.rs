//! Named timeslot segments.
//!
//! A segment is a 0/1 wide row marking a set of slots, e.g. "weekday
//! mornings". Segment sets are ordinary wide matrices, so they can be stacked
//! and passed to `summary::sum_over_segments`.

use lc_common::{Error, GroupKey, Result, WeekStart, DAYS_IN_WEEK};

use crate::calendar::{CalendarGrid, TimeSlot};
use crate::frame::WideMatrix;

const MONDAY_FIRST: [&str; DAYS_IN_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Mask of the half-open slot range `[start, end)`.
///
/// An end before the start wraps over the end of the week, so
/// `(Sun 23:00, Mon 01:00)` covers two hours. Equal bounds are rejected as
/// an empty segment.
pub fn range_segment(grid: &CalendarGrid, start: TimeSlot, end: TimeSlot) -> Result<Vec<u64>> {
    let n = grid.n_slots();
    let from = grid.index_for(start);
    let to = grid.index_for(end);
    if from == to {
        return Err(Error::invalid(
            "segment",
            format!("{} to {} is empty", grid.token_for(start), grid.token_for(end)),
        ));
    }
    let len = (to + n - from) % n;
    let mut mask = vec![0u64; n];
    for k in 0..len {
        mask[(from + k) % n] = 1;
    }
    Ok(mask)
}

/// A single named segment as a one-row wide matrix.
pub fn named_segment(
    grid: &CalendarGrid,
    name: &str,
    start: TimeSlot,
    end: TimeSlot,
) -> Result<WideMatrix<u64>> {
    let mask = range_segment(grid, start, end)?;
    WideMatrix::from_rows(*grid, vec![(GroupKey::single(name), mask)])
}

/// Day-name labels in the grid's day order.
pub fn day_names(week_start: WeekStart) -> Vec<&'static str> {
    (0..DAYS_IN_WEEK)
        .map(|day| MONDAY_FIRST[week_start.relabel(day, WeekStart::Monday)])
        .collect()
}

/// One segment per day, named by weekday.
pub fn dow_segments(grid: &CalendarGrid) -> Result<WideMatrix<u64>> {
    let per_day = grid.slots_per_day();
    let rows = day_names(grid.week_start())
        .into_iter()
        .enumerate()
        .map(|(day, name)| {
            let mut mask = vec![0u64; grid.n_slots()];
            mask[day * per_day..(day + 1) * per_day].fill(1);
            (GroupKey::single(name), mask)
        })
        .collect();
    WideMatrix::from_rows(*grid, rows)
}

/// One segment per slot, named by its vocab token.
pub fn every_slot_segments(grid: &CalendarGrid) -> Result<WideMatrix<u64>> {
    let n = grid.n_slots();
    let rows = grid
        .full_vocabulary()
        .into_iter()
        .enumerate()
        .map(|(index, token)| {
            let mut mask = vec![0u64; n];
            mask[index] = 1;
            (GroupKey::single(token), mask)
        })
        .collect();
    WideMatrix::from_rows(*grid, rows)
}

/// Stack segment sets into one, in order. Names must stay unique.
pub fn stack_segments(parts: &[WideMatrix<u64>]) -> Result<WideMatrix<u64>> {
    let (first, rest) = parts
        .split_first()
        .ok_or_else(|| Error::invalid("segments", "nothing to stack"))?;
    rest.iter().try_fold(first.clone(), |acc, part| acc.concat(part))
}
