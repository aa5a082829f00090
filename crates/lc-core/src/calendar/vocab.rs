//! Canonical timeslot vocabulary.
//!
//! Tokens are `"DD BB"`: a two-digit day followed by the bin index, padded to
//! `max(2, digits(H - 1))`. With hourly bins the bin index is the hour, so
//! Tuesday 17:00 is `"01 17"`. Ordering is day-major regardless of which
//! weekday the grid calls day 0.

use std::sync::OnceLock;

use lc_common::{Error, Result};
use sha2::{Digest, Sha256};

use super::grid::{CalendarGrid, TimeSlot};

static HOURLY_VOCAB: OnceLock<Vec<String>> = OnceLock::new();

impl CalendarGrid {
    /// Width of the bin part of a token.
    pub fn token_width(&self) -> usize {
        let last = self.slots_per_day().saturating_sub(1);
        last.to_string().len().max(2)
    }

    pub fn token_for(&self, slot: TimeSlot) -> String {
        format!(
            "{:02} {:0width$}",
            slot.day(),
            slot.bin(),
            width = self.token_width()
        )
    }

    /// Dense column index `day * H + bin`.
    pub fn index_for(&self, slot: TimeSlot) -> usize {
        slot.day() * self.slots_per_day() + slot.bin()
    }

    /// Decode a token, rejecting anything `token_for` would not produce.
    pub fn slot_for(&self, token: &str) -> Result<TimeSlot> {
        let (day, bin) = token
            .split_once(' ')
            .ok_or_else(|| Error::parse(token, "expected \"DD BB\""))?;

        if day.len() != 2 {
            return Err(Error::parse(token, "day must be 2 digits"));
        }
        if bin.len() != self.token_width() {
            return Err(Error::parse(
                token,
                format!("bin must be {} digits", self.token_width()),
            ));
        }

        let day = parse_digits(token, day, "day")?;
        let bin = parse_digits(token, bin, "bin")?;
        self.slot(day, bin)
            .map_err(|_| Error::parse(token, "day or bin out of range"))
    }

    /// Dense index of a token.
    pub fn index_of_token(&self, token: &str) -> Result<usize> {
        self.slot_for(token).map(|slot| self.index_for(slot))
    }

    /// All 7H tokens in column order.
    ///
    /// Deterministic for a given bin width, so independently built matrices
    /// line up column for column.
    pub fn full_vocabulary(&self) -> Vec<String> {
        if self.bin_minutes() == 60 {
            return hourly_vocabulary().to_vec();
        }
        self.slots().map(|slot| self.token_for(slot)).collect()
    }

    /// SHA-256 over the ordered token list.
    pub fn layout_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for token in self.full_vocabulary() {
            hasher.update(token.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// The 168-token vocabulary for hourly bins, built once.
pub fn hourly_vocabulary() -> &'static [String] {
    HOURLY_VOCAB.get_or_init(|| {
        let grid = CalendarGrid::hourly();
        grid.slots().map(|slot| grid.token_for(slot)).collect()
    })
}

fn parse_digits(token: &str, part: &str, what: &str) -> Result<usize> {
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::parse(token, format!("{} is not numeric", what)));
    }
    part.parse::<usize>()
        .map_err(|e| Error::parse(token, format!("{}: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_common::WeekStart;

    #[test]
    fn test_token_for_hourly() {
        let grid = CalendarGrid::hourly();
        let slot = grid.slot(1, 17).unwrap();
        assert_eq!(grid.token_for(slot), "01 17");
        assert_eq!(grid.index_for(slot), 41);
        assert_eq!(grid.token_for(grid.slot(0, 0).unwrap()), "00 00");
    }

    #[test]
    fn test_token_width_grows_with_bins() {
        assert_eq!(CalendarGrid::hourly().token_width(), 2);
        let grid = CalendarGrid::new(10, WeekStart::Monday).unwrap();
        assert_eq!(grid.slots_per_day(), 144);
        assert_eq!(grid.token_width(), 3);
        assert_eq!(grid.token_for(grid.slot(6, 143).unwrap()), "06 143");
        let daily = CalendarGrid::new(1440, WeekStart::Monday).unwrap();
        assert_eq!(daily.token_for(daily.slot(3, 0).unwrap()), "03 00");
    }

    #[test]
    fn test_slot_for_roundtrip_every_token() {
        let grid = CalendarGrid::new(30, WeekStart::Sunday).unwrap();
        for (index, token) in grid.full_vocabulary().iter().enumerate() {
            let slot = grid.slot_for(token).unwrap();
            assert_eq!(grid.index_for(slot), index);
        }
    }

    #[test]
    fn test_slot_for_rejects_malformed() {
        let grid = CalendarGrid::hourly();
        for bad in ["", "0117", "1 17", "01 7", "01 170", "0a 17", "07 00", "00 24", "01  17", "+1 17"] {
            let err = grid.slot_for(bad).unwrap_err();
            assert_eq!(err.code(), 30, "{:?} should be a parse error", bad);
        }
    }

    #[test]
    fn test_parse_error_carries_token() {
        let err = CalendarGrid::hourly().slot_for("zz 01").unwrap_err();
        match err {
            Error::Parse { token, .. } => assert_eq!(token, "zz 01"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_vocabulary_is_complete_and_ordered() {
        let vocab = CalendarGrid::hourly().full_vocabulary();
        assert_eq!(vocab.len(), 168);
        assert_eq!(vocab[0], "00 00");
        assert_eq!(vocab[23], "00 23");
        assert_eq!(vocab[24], "01 00");
        assert_eq!(vocab[167], "06 23");
        let mut sorted = vocab.clone();
        sorted.sort();
        assert_eq!(sorted, vocab);
    }

    #[test]
    fn test_vocabulary_independent_of_week_start() {
        let monday = CalendarGrid::hourly();
        let sunday = monday.with_week_start(WeekStart::Sunday);
        assert_eq!(monday.full_vocabulary(), sunday.full_vocabulary());
        assert_eq!(monday.layout_fingerprint(), sunday.layout_fingerprint());
    }

    #[test]
    fn test_fingerprint_differs_by_bin_width() {
        let hourly = CalendarGrid::hourly();
        let half = CalendarGrid::new(30, WeekStart::Monday).unwrap();
        assert_ne!(hourly.layout_fingerprint(), half.layout_fingerprint());
        assert_eq!(hourly.layout_fingerprint().len(), 64);
    }
}
