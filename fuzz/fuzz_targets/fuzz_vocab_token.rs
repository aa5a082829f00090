//! Fuzz target for vocab token decoding.
//!
//! Any token that decodes must re-encode to exactly the same string.

#![no_main]

use arbitrary::Arbitrary;
use lc_common::WeekStart;
use lc_core::CalendarGrid;
use libfuzzer_sys::fuzz_target;

const BIN_WIDTHS: [u32; 6] = [1, 10, 15, 60, 120, 1440];

#[derive(Debug, Arbitrary)]
struct Input {
    bin_choice: u8,
    sunday: bool,
    token: String,
}

fuzz_target!(|input: Input| {
    let bin = BIN_WIDTHS[input.bin_choice as usize % BIN_WIDTHS.len()];
    let week_start = if input.sunday { WeekStart::Sunday } else { WeekStart::Monday };
    let Ok(grid) = CalendarGrid::new(bin, week_start) else {
        return;
    };

    if let Ok(slot) = grid.slot_for(&input.token) {
        assert_eq!(grid.token_for(slot), input.token);
        assert!(grid.index_for(slot) < grid.n_slots());
    }
});
