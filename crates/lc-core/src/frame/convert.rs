//! Conversions between wide and long frames.
//!
//! `widen(wide_to_long(w)) == w` for any wide matrix `w` when the long frame
//! keeps `w`'s week start.

use std::collections::{HashMap, HashSet};

use lc_common::{Error, GroupKey, Result, WeekStart};

use super::long::{LongFrame, LongRow};
use super::wide::WideMatrix;
use super::CellValue;
use crate::calendar::CalendarGrid;

/// Explode one wide row into 7H long rows, relabeling days from the grid's
/// week start into `week_start`.
///
/// The exploded values sum to the row sum.
pub fn wide_row_to_long<T: CellValue>(
    grid: &CalendarGrid,
    group: &GroupKey,
    row: &[T],
    week_start: WeekStart,
) -> Result<Vec<LongRow<T>>> {
    if row.len() != grid.n_slots() {
        return Err(Error::shape("wide_row_to_long", grid.n_slots(), row.len()));
    }
    let per_day = grid.slots_per_day();
    let from = grid.week_start();
    let mut rows: Vec<LongRow<T>> = row
        .iter()
        .enumerate()
        .map(|(col, value)| LongRow {
            group: group.clone(),
            day_of_week: from.relabel(col / per_day, week_start),
            hour_bin: col % per_day,
            value: *value,
        })
        .collect();
    rows.sort_by_key(|r| (r.day_of_week, r.hour_bin));
    Ok(rows)
}

/// Explode every row of a wide matrix, zeros included.
pub fn wide_to_long<T: CellValue>(wide: &WideMatrix<T>, week_start: WeekStart) -> LongFrame<T> {
    let grid = *wide.grid();
    let mut frame = LongFrame::new(grid.with_week_start(week_start));
    for (group, row) in wide.iter_rows() {
        // Row length is guaranteed by WideMatrix.
        if let Ok(rows) = wide_row_to_long(&grid, group, row, week_start) {
            frame.extend_checked(rows);
        }
    }
    frame
}

/// Long format for wide rows that have no group names.
///
/// Each row's key is its position, stored under `group_column`, so row order
/// and group correspondence survive the conversion.
pub fn dataframe_to_long_format<T: CellValue>(
    grid: CalendarGrid,
    rows: Vec<Vec<T>>,
    group_column: &str,
    week_start: WeekStart,
) -> Result<LongFrame<T>> {
    let wide = WideMatrix::from_unnamed_rows(grid, rows)?;
    Ok(wide_to_long(&wide, week_start).with_group_column(group_column))
}

/// Pivot a long frame to wide.
///
/// Groups keep their first-appearance order. Missing slots are zero, and
/// repeated (group, slot) rows are summed.
pub fn widen<T: CellValue>(long: &LongFrame<T>) -> Result<WideMatrix<T>> {
    let mut groups: Vec<GroupKey> = Vec::new();
    let mut seen: HashSet<&GroupKey> = HashSet::new();
    for row in long.rows() {
        if seen.insert(&row.group) {
            groups.push(row.group.clone());
        }
    }
    pivot(long, groups)
}

/// Pivot a long frame onto an explicit group list.
///
/// Listed groups with no rows become all-zero rows. A row whose group is not
/// listed is an error.
pub fn widen_with_groups<T: CellValue>(
    long: &LongFrame<T>,
    groups: &[GroupKey],
) -> Result<WideMatrix<T>> {
    pivot(long, groups.to_vec())
}

fn pivot<T: CellValue>(long: &LongFrame<T>, groups: Vec<GroupKey>) -> Result<WideMatrix<T>> {
    let grid = *long.grid();
    let n_slots = grid.n_slots();
    let position: HashMap<GroupKey, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (g.clone(), i))
        .collect();

    let mut cells: Vec<Vec<T>> = vec![Vec::new(); groups.len() * n_slots];
    for row in long.rows() {
        let r = *position.get(&row.group).ok_or_else(|| {
            Error::invalid("group", format!("group {} is not in the group list", row.group))
        })?;
        let slot = grid.slot(row.day_of_week, row.hour_bin)?;
        cells[r * n_slots + grid.index_for(slot)].push(row.value);
    }

    let mut values = cells
        .into_iter()
        .map(|mut cell| T::total(&mut cell))
        .collect::<Vec<T>>()
        .into_iter();
    let rows = groups
        .into_iter()
        .map(|g| (g, values.by_ref().take(n_slots).collect()))
        .collect();
    WideMatrix::from_rows(grid, rows)
}
