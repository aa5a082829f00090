//! Week-start conventions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days in a week.
pub const DAYS_IN_WEEK: usize = 7;

/// Which weekday is labeled day 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// Day index of Monday under this convention.
    fn monday_offset(self) -> usize {
        match self {
            WeekStart::Monday => 0,
            WeekStart::Sunday => 1,
        }
    }

    /// Day index relative to this convention for a weekday counted from Monday.
    pub fn day_from_monday(self, days_from_monday: usize) -> usize {
        (days_from_monday % DAYS_IN_WEEK + self.monday_offset()) % DAYS_IN_WEEK
    }

    /// Relabel a day index from this convention into `target`.
    ///
    /// Monday-first data shown Sunday-first moves every day forward by one,
    /// with Sunday wrapping to 0.
    pub fn relabel(self, day: usize, target: WeekStart) -> usize {
        let shift = DAYS_IN_WEEK + target.monday_offset() - self.monday_offset();
        (day + shift) % DAYS_IN_WEEK
    }
}

impl std::str::FromStr for WeekStart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            _ => Err(format!("unknown week start: {}", s)),
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekStart::Monday => write!(f, "monday"),
            WeekStart::Sunday => write!(f, "sunday"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_from_monday() {
        assert_eq!(WeekStart::Monday.day_from_monday(0), 0);
        assert_eq!(WeekStart::Monday.day_from_monday(6), 6);
        assert_eq!(WeekStart::Sunday.day_from_monday(0), 1);
        assert_eq!(WeekStart::Sunday.day_from_monday(6), 0);
    }

    #[test]
    fn test_relabel_monday_to_sunday() {
        // Mon(0) -> 1, Sat(5) -> 6, Sun(6) -> 0
        assert_eq!(WeekStart::Monday.relabel(0, WeekStart::Sunday), 1);
        assert_eq!(WeekStart::Monday.relabel(5, WeekStart::Sunday), 6);
        assert_eq!(WeekStart::Monday.relabel(6, WeekStart::Sunday), 0);
    }

    #[test]
    fn test_relabel_is_invertible() {
        for day in 0..DAYS_IN_WEEK {
            let there = WeekStart::Sunday.relabel(day, WeekStart::Monday);
            assert_eq!(WeekStart::Monday.relabel(there, WeekStart::Sunday), day);
            assert_eq!(WeekStart::Monday.relabel(day, WeekStart::Monday), day);
        }
    }

    #[test]
    fn test_week_start_parse() {
        assert_eq!("Sunday".parse::<WeekStart>().unwrap(), WeekStart::Sunday);
        assert_eq!("mon".parse::<WeekStart>().unwrap(), WeekStart::Monday);
        assert!("friday".parse::<WeekStart>().is_err());
    }
}
