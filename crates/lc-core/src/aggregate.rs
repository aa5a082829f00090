//! Event aggregation into weekly histograms.
//!
//! Every event is discretized onto the grid and accumulated under its
//! (group, slot) key. Output rows are ordered by group key, so the result does
//! not depend on the order of the input rows.

use std::collections::{BTreeMap, BTreeSet};

use lc_common::{GroupKey, Result, WeekStart};
use lc_config::{CalendarConfig, EmptyGroups};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calendar::CalendarGrid;
use crate::events::{read_key, read_timestamp, read_weight, EventFrame, TimestampCell};
use crate::frame::{wide_to_long, widen, CellValue, LongFrame, LongRow, WideMatrix};
use crate::logging::event_names;

/// What happened to the input rows of one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    pub total_rows: usize,
    pub used_rows: usize,
    pub null_timestamps: usize,
    pub unparseable_timestamps: usize,
    /// Rows excluded because a grouping cell was null.
    pub null_keys: usize,
    /// Groups in the output.
    pub groups: usize,
    /// Output groups with no surviving events.
    pub empty_groups: usize,
}

impl AggregationReport {
    pub fn dropped_rows(&self) -> usize {
        self.null_timestamps + self.unparseable_timestamps + self.null_keys
    }
}

/// Aggregation output in the requested shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped<T> {
    Wide(WideMatrix<T>),
    Long(LongFrame<T>),
}

/// Output plus report.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated<T> {
    pub output: Shaped<T>,
    pub report: AggregationReport,
}

impl<T: CellValue> Aggregated<T> {
    /// Wide form; long output is pivoted.
    pub fn into_wide(self) -> Result<WideMatrix<T>> {
        match self.output {
            Shaped::Wide(wide) => Ok(wide),
            Shaped::Long(long) => widen(&long),
        }
    }

    /// Long form; wide output is exploded with zeros included.
    pub fn into_long(self) -> LongFrame<T> {
        match self.output {
            Shaped::Wide(wide) => {
                let week_start = wide.grid().week_start();
                wide_to_long(&wide, week_start)
            }
            Shaped::Long(long) => long,
        }
    }
}

/// Configurable event aggregator.
///
/// The grid is validated when it is built, so a bad bin width fails before
/// any rows are read.
#[derive(Debug, Clone)]
pub struct EventAggregator {
    grid: CalendarGrid,
    timestamp_col: String,
    group_by: Vec<String>,
    widen: bool,
    empty_groups: EmptyGroups,
    expected_groups: Vec<GroupKey>,
    timestamp_formats: Vec<String>,
}

impl EventAggregator {
    pub fn new(grid: CalendarGrid, timestamp_col: impl Into<String>) -> Self {
        EventAggregator {
            grid,
            timestamp_col: timestamp_col.into(),
            group_by: Vec::new(),
            widen: true,
            empty_groups: EmptyGroups::default(),
            expected_groups: Vec::new(),
            timestamp_formats: CalendarConfig::default().timestamp_formats,
        }
    }

    /// Aggregator following a loaded configuration.
    pub fn from_config(config: &CalendarConfig, timestamp_col: impl Into<String>) -> Result<Self> {
        let grid = CalendarGrid::from_config(config)?;
        Ok(Self::new(grid, timestamp_col)
            .empty_groups(config.empty_groups)
            .timestamp_formats(config.timestamp_formats.clone()))
    }

    /// Grouping columns. With none, the whole table is one document.
    pub fn group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Emit a wide matrix (default) or a sparse long frame.
    pub fn widen(mut self, widen: bool) -> Self {
        self.widen = widen;
        self
    }

    pub fn empty_groups(mut self, policy: EmptyGroups) -> Self {
        self.empty_groups = policy;
        self
    }

    /// Groups that must appear in the output, as zero rows if need be.
    pub fn expected_groups(mut self, groups: Vec<GroupKey>) -> Self {
        self.expected_groups = groups;
        self
    }

    pub fn timestamp_formats(mut self, formats: Vec<String>) -> Self {
        self.timestamp_formats = formats;
        self
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    /// Count events per (group, slot).
    pub fn count(&self, events: &EventFrame) -> Result<Aggregated<u64>> {
        self.run(events, None, |_| 1)
    }

    /// Sum a weight column per (group, slot).
    ///
    /// Null, non-numeric and negative weights are rejected.
    pub fn sum_weights(&self, events: &EventFrame, weight_col: &str) -> Result<Aggregated<f64>> {
        let weight_idx = events.column_index(weight_col)?;
        let weights = events
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| read_weight(&row[weight_idx], weight_col, i))
            .collect::<Result<Vec<f64>>>()?;
        self.run(events, Some(weight_col), |i| weights[i])
    }

    fn run<T: CellValue>(
        &self,
        events: &EventFrame,
        weight_col: Option<&str>,
        value_of: impl Fn(usize) -> T,
    ) -> Result<Aggregated<T>> {
        let ts_idx = events.column_index(&self.timestamp_col)?;
        let key_idx = self
            .group_by
            .iter()
            .map(|c| events.column_index(c))
            .collect::<Result<Vec<usize>>>()?;

        debug!(
            target: event_names::AGGREGATE_STARTED,
            rows = events.len(),
            bin_minutes = self.grid.bin_minutes(),
            week_start = %self.grid.week_start(),
            weight = weight_col.unwrap_or("count"),
            "aggregating events"
        );

        let mut report = AggregationReport {
            total_rows: events.len(),
            ..Default::default()
        };
        let mut seen: BTreeSet<GroupKey> = BTreeSet::new();
        let mut cells: BTreeMap<(GroupKey, usize), Vec<T>> = BTreeMap::new();

        'rows: for (i, row) in events.rows().iter().enumerate() {
            let mut parts = Vec::with_capacity(key_idx.len());
            for &k in &key_idx {
                match read_key(&row[k]) {
                    Some(part) => parts.push(part),
                    None => {
                        report.null_keys += 1;
                        continue 'rows;
                    }
                }
            }
            let key = GroupKey(parts);

            let ts = match read_timestamp(&row[ts_idx], &self.timestamp_formats) {
                TimestampCell::Valid(ts) => ts,
                TimestampCell::Null => {
                    report.null_timestamps += 1;
                    seen.insert(key);
                    continue;
                }
                TimestampCell::Unparseable => {
                    report.unparseable_timestamps += 1;
                    seen.insert(key);
                    continue;
                }
            };

            let slot = self.grid.discretize(&ts);
            cells
                .entry((key.clone(), self.grid.index_for(slot)))
                .or_default()
                .push(value_of(i));
            seen.insert(key);
            report.used_rows += 1;
        }

        if report.dropped_rows() > 0 {
            warn!(
                target: event_names::AGGREGATE_ROWS_DROPPED,
                null_timestamps = report.null_timestamps,
                unparseable_timestamps = report.unparseable_timestamps,
                null_keys = report.null_keys,
                "excluded rows from aggregation"
            );
        }

        let mut groups: BTreeSet<GroupKey> = cells.keys().map(|(g, _)| g.clone()).collect();
        let populated = groups.len();
        groups.extend(self.expected_groups.iter().cloned());
        if self.empty_groups == EmptyGroups::Keep {
            groups.extend(seen);
        }
        report.groups = groups.len();
        report.empty_groups = groups.len() - populated;

        let output = if self.widen {
            Shaped::Wide(self.pivot(groups, cells)?)
        } else {
            Shaped::Long(self.long(cells))
        };

        info!(
            target: event_names::AGGREGATE_FINISHED,
            used_rows = report.used_rows,
            dropped_rows = report.dropped_rows(),
            groups = report.groups,
            empty_groups = report.empty_groups,
            "aggregation finished"
        );

        Ok(Aggregated { output, report })
    }

    fn pivot<T: CellValue>(
        &self,
        groups: BTreeSet<GroupKey>,
        cells: BTreeMap<(GroupKey, usize), Vec<T>>,
    ) -> Result<WideMatrix<T>> {
        let n_slots = self.grid.n_slots();
        let mut rows: BTreeMap<GroupKey, Vec<T>> = groups
            .into_iter()
            .map(|g| (g, vec![T::default(); n_slots]))
            .collect();
        for ((group, index), mut values) in cells {
            if let Some(row) = rows.get_mut(&group) {
                row[index] = T::total(&mut values);
            }
        }
        WideMatrix::from_rows(self.grid, rows.into_iter().collect())
    }

    /// Sparse long output. Empty groups have no rows to carry them, so they
    /// only show up in the report.
    fn long<T: CellValue>(&self, cells: BTreeMap<(GroupKey, usize), Vec<T>>) -> LongFrame<T> {
        let per_day = self.grid.slots_per_day();
        let mut frame = LongFrame::new(self.grid);
        frame.extend_checked(cells.into_iter().map(|((group, index), mut values)| LongRow {
            group,
            day_of_week: index / per_day,
            hour_bin: index % per_day,
            value: T::total(&mut values),
        }));
        frame
    }
}

/// Count events per group and timeslot.
///
/// `group_by` may be empty, in which case all rows form one document.
pub fn aggregate(
    events: &EventFrame,
    group_by: &[&str],
    timestamp_col: &str,
    bin_minutes: u32,
    week_start: WeekStart,
    widen: bool,
) -> Result<Aggregated<u64>> {
    let grid = CalendarGrid::new(bin_minutes, week_start)?;
    EventAggregator::new(grid, timestamp_col)
        .group_by(group_by.iter().copied())
        .widen(widen)
        .count(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Cell;
    use lc_common::Error;

    fn events() -> EventFrame {
        EventFrame::from_rows(
            ["user", "ts", "amount"],
            vec![
                vec!["a".into(), "2023-01-02 09:00:00".into(), 1.5.into()],
                vec!["a".into(), "2023-01-02 09:30:00".into(), 2.0.into()],
                vec!["a".into(), "2023-01-03 14:00:00".into(), 0.5.into()],
                vec!["b".into(), Cell::Null, 1.0.into()],
                vec![Cell::Null, "2023-01-03 14:00:00".into(), 1.0.into()],
                vec!["c".into(), "not a time".into(), 1.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_counts_and_report() {
        let result = aggregate(&events(), &["user"], "ts", 60, WeekStart::Monday, true).unwrap();
        assert_eq!(
            result.report,
            AggregationReport {
                total_rows: 6,
                used_rows: 3,
                null_timestamps: 1,
                unparseable_timestamps: 1,
                null_keys: 1,
                groups: 1,
                empty_groups: 0,
            }
        );
        let wide = result.into_wide().unwrap();
        assert_eq!(wide.groups(), &[GroupKey::single("a")]);
        assert_eq!(wide.value_at(&GroupKey::single("a"), "00 09").unwrap(), 2);
        assert_eq!(wide.value_at(&GroupKey::single("a"), "01 14").unwrap(), 1);
    }

    #[test]
    fn test_keep_policy_emits_zero_rows() {
        let grid = CalendarGrid::hourly();
        let result = EventAggregator::new(grid, "ts")
            .group_by(["user"])
            .empty_groups(EmptyGroups::Keep)
            .count(&events())
            .unwrap();
        assert_eq!(result.report.groups, 3);
        assert_eq!(result.report.empty_groups, 2);
        let wide = result.into_wide().unwrap();
        assert_eq!(wide.row_sums(), vec![3, 0, 0]);
    }

    #[test]
    fn test_expected_groups_without_keep() {
        let grid = CalendarGrid::hourly();
        let wide = EventAggregator::new(grid, "ts")
            .group_by(["user"])
            .expected_groups(vec![GroupKey::single("z")])
            .count(&events())
            .unwrap()
            .into_wide()
            .unwrap();
        assert_eq!(wide.groups(), &[GroupKey::single("a"), GroupKey::single("z")]);
    }

    #[test]
    fn test_weighted_sums() {
        let grid = CalendarGrid::hourly();
        let wide = EventAggregator::new(grid, "ts")
            .group_by(["user"])
            .sum_weights(&events(), "amount")
            .unwrap()
            .into_wide()
            .unwrap();
        assert_eq!(wide.value_at(&GroupKey::single("a"), "00 09").unwrap(), 3.5);
        assert_eq!(wide.row_sums(), vec![4.0]);
    }

    #[test]
    fn test_bad_weight_rejected() {
        let frame = EventFrame::from_rows(
            ["ts", "w"],
            vec![vec!["2023-01-02 09:00:00".into(), "heavy".into()]],
        )
        .unwrap();
        let err = EventAggregator::new(CalendarGrid::hourly(), "ts")
            .sum_weights(&frame, "w")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_columns() {
        let err = aggregate(&events(), &["nope"], "ts", 60, WeekStart::Monday, true).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
        let err = aggregate(&events(), &[], "when", 60, WeekStart::Monday, true).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_bad_bin_width_fails_before_reading() {
        let err = aggregate(&EventFrame::new(["ts"]), &[], "ts", 7, WeekStart::Monday, true)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBinWidth { minutes: 7 }));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = CalendarConfig {
            timestamp_formats: vec!["  ".to_string()],
            ..CalendarConfig::default()
        };
        let err = EventAggregator::from_config(&config, "ts").unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("timestamp_formats")));
    }

    #[test]
    fn test_long_output_is_sparse() {
        let result = aggregate(&events(), &["user"], "ts", 60, WeekStart::Monday, false).unwrap();
        let long = match &result.output {
            Shaped::Long(long) => long.clone(),
            Shaped::Wide(_) => panic!("expected long output"),
        };
        assert_eq!(long.len(), 2);
        assert_eq!(long.total(), 3);
        assert_eq!(result.into_wide().unwrap().n_cols(), 168);
    }

    #[test]
    fn test_no_grouping_is_one_document() {
        let result = aggregate(&events(), &[], "ts", 60, WeekStart::Monday, true).unwrap();
        let wide = result.into_wide().unwrap();
        assert_eq!(wide.n_rows(), 1);
        assert_eq!(wide.row_sums(), vec![4]);
    }
}
