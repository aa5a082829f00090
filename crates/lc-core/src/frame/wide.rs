//! Dense wide matrices: one row per group, one column per timeslot.

use std::collections::HashSet;
use std::path::Path;

use lc_common::{Error, GroupKey, Result, WeekStart};
use lc_math::Matrix;
use serde::{Deserialize, Serialize};

use super::CellValue;
use crate::calendar::CalendarGrid;

/// Rows are unique groups; columns are the full vocabulary of `grid`.
///
/// Values are stored row-major and are always finite and nonnegative.
#[derive(Debug, Clone, PartialEq)]
pub struct WideMatrix<T> {
    grid: CalendarGrid,
    groups: Vec<GroupKey>,
    values: Vec<T>,
}

impl<T: CellValue> WideMatrix<T> {
    /// Matrix with no rows.
    pub fn empty(grid: CalendarGrid) -> Self {
        WideMatrix {
            grid,
            groups: Vec::new(),
            values: Vec::new(),
        }
    }

    /// All-zero rows for the given groups.
    pub fn zeros(grid: CalendarGrid, groups: Vec<GroupKey>) -> Result<Self> {
        ensure_unique(&groups)?;
        let values = vec![T::default(); groups.len() * grid.n_slots()];
        Ok(WideMatrix {
            grid,
            groups,
            values,
        })
    }

    /// Build from keyed rows. Each row must have exactly 7H valid values and
    /// keys must be unique.
    pub fn from_rows(grid: CalendarGrid, rows: Vec<(GroupKey, Vec<T>)>) -> Result<Self> {
        let n_slots = grid.n_slots();
        let mut groups = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len() * n_slots);
        for (key, row) in rows {
            if row.len() != n_slots {
                return Err(Error::shape("wide row", n_slots, row.len()));
            }
            if let Some(bad) = row.iter().find(|v| !v.is_valid()) {
                return Err(Error::invalid(
                    key.to_string(),
                    format!("wide values must be finite and nonnegative, got {:?}", bad),
                ));
            }
            groups.push(key);
            values.extend(row);
        }
        ensure_unique(&groups)?;
        Ok(WideMatrix {
            grid,
            groups,
            values,
        })
    }

    /// Build from rows without names; keys are the row positions.
    pub fn from_unnamed_rows(grid: CalendarGrid, rows: Vec<Vec<T>>) -> Result<Self> {
        let keyed = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| (GroupKey::row(i), row))
            .collect();
        Self::from_rows(grid, keyed)
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub fn groups(&self) -> &[GroupKey] {
        &self.groups
    }

    pub fn n_rows(&self) -> usize {
        self.groups.len()
    }

    /// Always `grid.n_slots()`.
    pub fn n_cols(&self) -> usize {
        self.grid.n_slots()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn row(&self, index: usize) -> &[T] {
        let n = self.n_cols();
        &self.values[index * n..(index + 1) * n]
    }

    pub fn row_by_key(&self, key: &GroupKey) -> Option<&[T]> {
        self.groups
            .iter()
            .position(|g| g == key)
            .map(|index| self.row(index))
    }

    /// Value of one group at one vocab token.
    pub fn value_at(&self, key: &GroupKey, token: &str) -> Result<T> {
        let column = self.grid.index_of_token(token)?;
        let row = self
            .row_by_key(key)
            .ok_or_else(|| Error::invalid("group", format!("unknown group {}", key)))?;
        Ok(row[column])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = (&GroupKey, &[T])> {
        let n = self.n_cols().max(1);
        self.groups.iter().zip(self.values.chunks(n))
    }

    /// Raw row-major values.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Swap in new values of the same shape. Callers keep them valid.
    pub(crate) fn replace_values(&mut self, values: Vec<T>) {
        debug_assert_eq!(values.len(), self.values.len());
        self.values = values;
    }

    pub fn row_sums(&self) -> Vec<T> {
        self.iter_rows()
            .map(|(_, row)| T::total(&mut row.to_vec()))
            .collect()
    }

    /// Canonical vocab tokens, one per column.
    pub fn column_labels(&self) -> Vec<String> {
        self.grid.full_vocabulary()
    }

    pub fn to_f64(&self) -> WideMatrix<f64> {
        WideMatrix {
            grid: self.grid,
            groups: self.groups.clone(),
            values: self.values.iter().map(|v| v.to_f64()).collect(),
        }
    }

    /// Values as a dense matrix for the model boundary.
    pub fn to_matrix(&self) -> Matrix {
        let data = self.values.iter().map(|v| v.to_f64()).collect();
        Matrix::from_vec(self.n_rows(), self.n_cols(), data)
            .unwrap_or_else(|| Matrix::zeros(self.n_rows(), self.n_cols()))
    }

    /// Rows of `self` followed by rows of `other`.
    ///
    /// Both sides must share bin width and week start, and no group may
    /// appear twice.
    pub fn concat(&self, other: &WideMatrix<T>) -> Result<Self> {
        if !self.grid.compatible_with(&other.grid) {
            return Err(Error::IncompatibleGrid(format!(
                "{} minute bins ({}) vs {} minute bins ({})",
                self.grid.bin_minutes(),
                self.grid.week_start(),
                other.grid.bin_minutes(),
                other.grid.week_start()
            )));
        }
        let mut groups = self.groups.clone();
        groups.extend(other.groups.iter().cloned());
        ensure_unique(&groups)?;
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        Ok(WideMatrix {
            grid: self.grid,
            groups,
            values,
        })
    }

    /// Same data with day indices relabeled into another week-start
    /// convention, which rotates the columns by whole days.
    pub fn rebase(&self, week_start: WeekStart) -> Self {
        let from = self.grid.week_start();
        let per_day = self.grid.slots_per_day();
        let n = self.n_cols();
        let mut values = vec![T::default(); self.values.len()];
        for (r, row) in self.values.chunks(n.max(1)).enumerate() {
            for (col, value) in row.iter().enumerate() {
                let day = from.relabel(col / per_day, week_start);
                values[r * n + day * per_day + col % per_day] = *value;
            }
        }
        WideMatrix {
            grid: self.grid.with_week_start(week_start),
            groups: self.groups.clone(),
            values,
        }
    }

    /// Tabular persisted form: vocab tokens as column labels.
    pub fn to_persisted(&self) -> PersistedWide<T> {
        PersistedWide {
            bin_minutes: self.grid.bin_minutes(),
            week_start: self.grid.week_start(),
            columns: self.column_labels(),
            index: self.groups.clone(),
            data: self.iter_rows().map(|(_, row)| row.to_vec()).collect(),
        }
    }

    /// Rebuild from the persisted form, checking the column labels.
    pub fn from_persisted(persisted: PersistedWide<T>) -> Result<Self> {
        let grid = CalendarGrid::new(persisted.bin_minutes, persisted.week_start)?;
        let vocab = grid.full_vocabulary();
        if persisted.columns.len() != vocab.len() {
            return Err(Error::shape(
                "persisted columns",
                vocab.len(),
                persisted.columns.len(),
            ));
        }
        for (label, expected) in persisted.columns.iter().zip(&vocab) {
            if label != expected {
                grid.slot_for(label)?;
                return Err(Error::parse(
                    label.clone(),
                    format!("column out of order, expected {}", expected),
                ));
            }
        }
        if persisted.index.len() != persisted.data.len() {
            return Err(Error::invalid(
                "index",
                format!(
                    "{} keys for {} rows",
                    persisted.index.len(),
                    persisted.data.len()
                ),
            ));
        }
        Self::from_rows(grid, persisted.index.into_iter().zip(persisted.data).collect())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_persisted())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let persisted: PersistedWide<T> = serde_json::from_str(json)?;
        Self::from_persisted(persisted)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl WideMatrix<f64> {
    /// Wrap a dense matrix whose columns follow `grid`'s vocabulary.
    pub fn from_matrix(grid: CalendarGrid, groups: Vec<GroupKey>, matrix: &Matrix) -> Result<Self> {
        if matrix.cols() != grid.n_slots() {
            return Err(Error::shape("matrix", grid.n_slots(), matrix.cols()));
        }
        if groups.len() != matrix.rows() {
            return Err(Error::invalid(
                "groups",
                format!("{} keys for {} rows", groups.len(), matrix.rows()),
            ));
        }
        let rows = groups
            .into_iter()
            .zip(matrix.iter_rows().map(<[f64]>::to_vec))
            .collect();
        Self::from_rows(grid, rows)
    }
}

/// On-disk form of a wide matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedWide<T> {
    pub bin_minutes: u32,
    pub week_start: WeekStart,
    /// Canonical vocab tokens, exactly 7H of them.
    pub columns: Vec<String>,
    /// Group key per row.
    pub index: Vec<GroupKey>,
    pub data: Vec<Vec<T>>,
}

fn ensure_unique(groups: &[GroupKey]) -> Result<()> {
    let mut seen = HashSet::with_capacity(groups.len());
    for key in groups {
        if !seen.insert(key) {
            return Err(Error::invalid(
                "group",
                format!("duplicate group {} in wide matrix", key),
            ));
        }
    }
    Ok(())
}
