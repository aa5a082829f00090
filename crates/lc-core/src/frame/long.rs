//! Long (tall) frames: one row per (group, day, bin).

use lc_common::{Error, GroupKey, Result, WeekStart};
use serde::{Deserialize, Serialize};

use super::CellValue;
use crate::calendar::CalendarGrid;

/// Default name of the group identifier column.
pub const DEFAULT_GROUP_COLUMN: &str = "group";

/// Default name of the value column.
pub const DEFAULT_VALUE_COLUMN: &str = "value";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow<T> {
    pub group: GroupKey,
    pub day_of_week: usize,
    pub hour_bin: usize,
    pub value: T,
}

/// Rows of (group, day_of_week, hour_bin, value) on a grid.
///
/// Day indices follow the grid's week start. Zero-valued rows may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct LongFrame<T> {
    grid: CalendarGrid,
    group_column: String,
    value_column: String,
    rows: Vec<LongRow<T>>,
}

impl<T: CellValue> LongFrame<T> {
    pub fn new(grid: CalendarGrid) -> Self {
        LongFrame {
            grid,
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            rows: Vec::new(),
        }
    }

    /// Build from rows, range-checking days, bins and values.
    pub fn from_rows(grid: CalendarGrid, rows: Vec<LongRow<T>>) -> Result<Self> {
        let mut frame = Self::new(grid);
        frame.rows.reserve(rows.len());
        for row in rows {
            frame.push(row)?;
        }
        Ok(frame)
    }

    pub fn with_group_column(mut self, name: impl Into<String>) -> Self {
        self.group_column = name.into();
        self
    }

    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = name.into();
        self
    }

    pub fn push(&mut self, row: LongRow<T>) -> Result<()> {
        self.grid.slot(row.day_of_week, row.hour_bin)?;
        if !row.value.is_valid() {
            return Err(Error::invalid(
                self.value_column.clone(),
                format!("{:?} is not finite and nonnegative", row.value),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append rows that are already range-checked.
    pub(crate) fn extend_checked(&mut self, rows: impl IntoIterator<Item = LongRow<T>>) {
        self.rows.extend(rows);
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub fn week_start(&self) -> WeekStart {
        self.grid.week_start()
    }

    pub fn group_column(&self) -> &str {
        &self.group_column
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn rows(&self) -> &[LongRow<T>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LongRow<T>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of every value in the frame.
    pub fn total(&self) -> T {
        let mut values: Vec<T> = self.rows.iter().map(|r| r.value).collect();
        T::total(&mut values)
    }

    /// Vocab token of a row under this frame's grid.
    pub fn token(&self, row: &LongRow<T>) -> Result<String> {
        let slot = self.grid.slot(row.day_of_week, row.hour_bin)?;
        Ok(self.grid.token_for(slot))
    }

    /// Drop rows whose value is zero.
    pub fn without_zeros(mut self) -> Self {
        self.rows.retain(|r| r.value != T::default());
        self
    }

    /// Rows as JSON objects keyed by the frame's column names.
    pub fn to_json_records(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut object = serde_json::Map::new();
                object.insert(self.group_column.clone(), serde_json::json!(row.group));
                object.insert("day_of_week".to_string(), serde_json::json!(row.day_of_week));
                object.insert("hour_bin".to_string(), serde_json::json!(row.hour_bin));
                object.insert(self.value_column.clone(), serde_json::json!(row.value));
                serde_json::Value::Object(object)
            })
            .collect()
    }
}
