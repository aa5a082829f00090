//! Event tables.
//!
//! `EventFrame` is the one tabular shape the aggregator reads. Adapters for
//! JSON records and plain rows live here; nothing downstream depends on where
//! the rows came from.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lc_common::{Error, KeyPart, Result};
use serde::{Deserialize, Serialize};

/// One cell of an event table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Bool(_) => "bool",
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Text(_) => "text",
            Cell::Timestamp(_) => "timestamp",
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(v: NaiveDateTime) -> Self {
        Cell::Timestamp(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// Outcome of reading a timestamp cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimestampCell {
    Valid(NaiveDateTime),
    Null,
    Unparseable,
}

/// Read a timestamp cell as a wall-clock time.
///
/// Text is tried as RFC 3339 first (offset ignored, wall clock kept), then
/// against each format in order, then as a bare `%Y-%m-%d` date at midnight.
/// Integers are Unix seconds read as UTC.
pub(crate) fn read_timestamp(cell: &Cell, formats: &[String]) -> TimestampCell {
    match cell {
        Cell::Null => TimestampCell::Null,
        Cell::Timestamp(ts) => TimestampCell::Valid(*ts),
        Cell::Int(secs) => match DateTime::from_timestamp(*secs, 0) {
            Some(dt) => TimestampCell::Valid(dt.naive_utc()),
            None => TimestampCell::Unparseable,
        },
        Cell::Text(text) => parse_timestamp_text(text.trim(), formats)
            .map(TimestampCell::Valid)
            .unwrap_or(TimestampCell::Unparseable),
        Cell::Bool(_) | Cell::Float(_) => TimestampCell::Unparseable,
    }
}

fn parse_timestamp_text(text: &str, formats: &[String]) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for format in formats {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Convert a grouping cell to a key part. `None` means the key is null.
pub(crate) fn read_key(cell: &Cell) -> Option<KeyPart> {
    match cell {
        Cell::Null => None,
        Cell::Int(v) => Some(KeyPart::Int(*v)),
        Cell::Text(s) => Some(KeyPart::Text(s.clone())),
        Cell::Bool(b) => Some(KeyPart::Text(b.to_string())),
        Cell::Float(f) => Some(KeyPart::Text(f.to_string())),
        Cell::Timestamp(ts) => Some(KeyPart::Text(ts.to_string())),
    }
}

/// Read a weight cell. Nulls, non-numeric cells and negative or non-finite
/// numbers are rejected rather than defaulted.
pub(crate) fn read_weight(cell: &Cell, column: &str, row: usize) -> Result<f64> {
    let value = match cell {
        Cell::Int(v) => *v as f64,
        Cell::Float(v) => *v,
        other => {
            return Err(Error::invalid(
                column,
                format!("row {}: weight must be numeric, got {}", row, other.kind()),
            ))
        }
    };
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid(
            column,
            format!("row {}: weight must be finite and nonnegative, got {}", row, value),
        ));
    }
    Ok(value)
}

/// A table of events with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl EventFrame {
    /// Empty table with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        EventFrame {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Table from rows; every row must have one cell per column.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self> {
        let mut frame = Self::new(columns);
        frame.rows.reserve(rows.len());
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::shape("event row", self.columns.len(), row.len()));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Table from JSON objects.
    ///
    /// Columns are the union of keys in first-seen order; a key missing from
    /// a record is a null cell. Strings stay text, so timestamps are parsed
    /// later with the configured formats.
    pub fn from_json_records(records: &[serde_json::Value]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                Error::invalid("record", format!("record {} is not a JSON object", i))
            })?;
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut frame = Self::new(columns.clone());
        for record in records {
            // Checked to be an object above.
            let Some(object) = record.as_object() else {
                continue;
            };
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let cell = match object.get(column) {
                    None => Cell::Null,
                    Some(value) => json_cell(column, value)?,
                };
                row.push(cell);
            }
            frame.rows.push(row);
        }
        Ok(frame)
    }

    /// Table from a JSON array of objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Self::from_json_records(&records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell> + '_> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[index]))
    }
}

fn json_cell(column: &str, value: &serde_json::Value) -> Result<Cell> {
    use serde_json::Value;
    Ok(match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => Cell::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Cell::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::invalid(
                column,
                "nested arrays and objects are not supported",
            ))
        }
    })
}
