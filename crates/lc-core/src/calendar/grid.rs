//! Calendar grid and timestamp discretization.
//!
//! A grid fixes the bin width and the week-start convention. Every bin width
//! is validated when the grid is built, so discretizing a timestamp never
//! fails.

use chrono::{Datelike, NaiveDateTime, Timelike};
use lc_common::{Error, Result, WeekStart, DAYS_IN_WEEK};
use lc_config::validate::{validate_bin_minutes, validate_calendar};
use lc_config::{CalendarConfig, MINUTES_IN_DAY};
use serde::{Deserialize, Serialize};

/// One (day_of_week, hour_bin) cell of the week.
///
/// Fields are private so a slot can only be built through a grid that has
/// range-checked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeSlot {
    day: u8,
    bin: u16,
}

impl TimeSlot {
    /// Day of week relative to the grid's week start, in [0, 7).
    pub fn day(&self) -> usize {
        self.day as usize
    }

    /// Bin within the day, in [0, H).
    pub fn bin(&self) -> usize {
        self.bin as usize
    }
}

/// Fixed bin width plus week-start convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct CalendarGrid {
    bin_minutes: u32,
    week_start: WeekStart,
}

#[derive(Deserialize)]
struct RawGrid {
    bin_minutes: u32,
    #[serde(default)]
    week_start: WeekStart,
}

impl TryFrom<RawGrid> for CalendarGrid {
    type Error = Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        CalendarGrid::new(raw.bin_minutes, raw.week_start)
    }
}

impl Default for CalendarGrid {
    fn default() -> Self {
        CalendarGrid::hourly()
    }
}

impl CalendarGrid {
    /// Build a grid, rejecting bin widths that do not split a day evenly.
    pub fn new(bin_minutes: u32, week_start: WeekStart) -> Result<Self> {
        validate_bin_minutes(bin_minutes).map_err(|_| Error::InvalidBinWidth {
            minutes: bin_minutes,
        })?;
        Ok(CalendarGrid {
            bin_minutes,
            week_start,
        })
    }

    /// 60-minute bins on a Monday-first week.
    pub fn hourly() -> Self {
        CalendarGrid {
            bin_minutes: 60,
            week_start: WeekStart::Monday,
        }
    }

    /// Grid described by a loaded configuration.
    ///
    /// The whole configuration is validated, not just the bin width.
    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        let grid = Self::new(config.bin_minutes, config.week_start)?;
        validate_calendar(config)?;
        Ok(grid)
    }

    pub fn bin_minutes(&self) -> u32 {
        self.bin_minutes
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Same bin width, different week-start convention.
    pub fn with_week_start(self, week_start: WeekStart) -> Self {
        CalendarGrid { week_start, ..self }
    }

    /// H: number of bins in one day.
    pub fn slots_per_day(&self) -> usize {
        (MINUTES_IN_DAY / self.bin_minutes) as usize
    }

    /// 7H: number of columns of every wide matrix on this grid.
    pub fn n_slots(&self) -> usize {
        DAYS_IN_WEEK * self.slots_per_day()
    }

    /// Whether matrices on both grids share a column layout.
    pub fn compatible_with(&self, other: &CalendarGrid) -> bool {
        self == other
    }

    /// Map a wall-clock timestamp onto its slot.
    ///
    /// No timezone conversion happens here; callers normalize first.
    pub fn discretize(&self, timestamp: &NaiveDateTime) -> TimeSlot {
        let from_monday = timestamp.weekday().num_days_from_monday() as usize;
        let day = self.week_start.day_from_monday(from_monday);
        let minutes = timestamp.hour() * 60 + timestamp.minute();
        TimeSlot {
            day: day as u8,
            bin: (minutes / self.bin_minutes) as u16,
        }
    }

    /// Build a slot from explicit indices, rejecting out-of-range values.
    pub fn slot(&self, day: usize, bin: usize) -> Result<TimeSlot> {
        if day >= DAYS_IN_WEEK {
            return Err(Error::invalid(
                "day_of_week",
                format!("{} is outside [0, {})", day, DAYS_IN_WEEK),
            ));
        }
        if bin >= self.slots_per_day() {
            return Err(Error::invalid(
                "hour_bin",
                format!("{} is outside [0, {})", bin, self.slots_per_day()),
            ));
        }
        Ok(TimeSlot {
            day: day as u8,
            bin: bin as u16,
        })
    }

    /// Build a slot from a dense index in [0, 7H).
    pub fn slot_at(&self, index: usize) -> Result<TimeSlot> {
        let per_day = self.slots_per_day();
        if index >= self.n_slots() {
            return Err(Error::invalid(
                "slot_index",
                format!("{} is outside [0, {})", index, self.n_slots()),
            ));
        }
        self.slot(index / per_day, index % per_day)
    }

    /// Iterate all slots in canonical day-major order.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        let per_day = self.slots_per_day();
        (0..self.n_slots()).map(move |index| TimeSlot {
            day: (index / per_day) as u8,
            bin: (index % per_day) as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_rejects_bin_width_not_dividing_day() {
        let err = CalendarGrid::new(7, WeekStart::Monday).unwrap_err();
        assert!(matches!(err, Error::InvalidBinWidth { minutes: 7 }));
        assert_eq!(err.code(), 11);
        assert!(CalendarGrid::new(0, WeekStart::Monday).is_err());
    }

    #[test]
    fn test_from_config_validates_whole_config() {
        let config = CalendarConfig::default().with_bin_minutes(30);
        assert_eq!(CalendarGrid::from_config(&config).unwrap().slots_per_day(), 48);

        let err = CalendarGrid::from_config(&CalendarConfig::default().with_bin_minutes(7))
            .unwrap_err();
        assert_eq!(err.code(), 11);

        let no_formats = CalendarConfig {
            timestamp_formats: vec![],
            ..CalendarConfig::default()
        };
        assert!(matches!(
            CalendarGrid::from_config(&no_formats),
            Err(Error::Configuration(_))
        ));

        let old_schema = CalendarConfig {
            schema_version: "0.9.0".to_string(),
            ..CalendarConfig::default()
        };
        assert_eq!(CalendarGrid::from_config(&old_schema).unwrap_err().code(), 10);
    }

    #[test]
    fn test_slot_counts() {
        let grid = CalendarGrid::hourly();
        assert_eq!(grid.slots_per_day(), 24);
        assert_eq!(grid.n_slots(), 168);

        let grid = CalendarGrid::new(15, WeekStart::Sunday).unwrap();
        assert_eq!(grid.slots_per_day(), 96);
        assert_eq!(grid.n_slots(), 672);
    }

    #[test]
    fn test_discretize_monday_start() {
        let grid = CalendarGrid::hourly();
        // 2023-01-02 is a Monday
        let slot = grid.discretize(&at(2023, 1, 2, 9, 30));
        assert_eq!((slot.day(), slot.bin()), (0, 9));

        let slot = grid.discretize(&at(2023, 1, 8, 23, 59));
        assert_eq!((slot.day(), slot.bin()), (6, 23));
    }

    #[test]
    fn test_discretize_sunday_start() {
        let grid = CalendarGrid::new(60, WeekStart::Sunday).unwrap();
        let sunday = grid.discretize(&at(2023, 1, 8, 0, 0));
        assert_eq!((sunday.day(), sunday.bin()), (0, 0));
        let monday = grid.discretize(&at(2023, 1, 2, 14, 0));
        assert_eq!((monday.day(), monday.bin()), (1, 14));
    }

    #[test]
    fn test_midnight_maps_to_bin_zero() {
        let grid = CalendarGrid::new(30, WeekStart::Monday).unwrap();
        let slot = grid.discretize(&at(2023, 1, 3, 0, 0));
        assert_eq!((slot.day(), slot.bin()), (1, 0));
        let slot = grid.discretize(&at(2023, 1, 3, 0, 29));
        assert_eq!(slot.bin(), 0);
        let slot = grid.discretize(&at(2023, 1, 3, 0, 30));
        assert_eq!(slot.bin(), 1);
    }

    #[test]
    fn test_slot_range_checks() {
        let grid = CalendarGrid::hourly();
        assert!(grid.slot(6, 23).is_ok());
        assert!(matches!(grid.slot(7, 0), Err(Error::InvalidValue { .. })));
        assert!(matches!(grid.slot(0, 24), Err(Error::InvalidValue { .. })));
        assert!(grid.slot_at(168).is_err());
        assert_eq!(grid.slot_at(25).unwrap(), grid.slot(1, 1).unwrap());
    }

    #[test]
    fn test_slots_are_day_major() {
        let grid = CalendarGrid::new(360, WeekStart::Monday).unwrap();
        let slots: Vec<(usize, usize)> = grid.slots().map(|s| (s.day(), s.bin())).collect();
        assert_eq!(slots.len(), 28);
        assert_eq!(slots[0], (0, 0));
        assert_eq!(slots[3], (0, 3));
        assert_eq!(slots[4], (1, 0));
    }

    #[test]
    fn test_grid_deserialize_validates() {
        let grid: CalendarGrid = serde_json::from_str(r#"{"bin_minutes": 30}"#).unwrap();
        assert_eq!(grid.slots_per_day(), 48);
        assert!(serde_json::from_str::<CalendarGrid>(r#"{"bin_minutes": 25}"#).is_err());
    }
}
