//! Fuzz target for aggregating arbitrary JSON event records.
//!
//! Every input row is either used or counted as dropped.

#![no_main]

use lc_common::WeekStart;
use lc_core::{aggregate, EventFrame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(records) = serde_json::from_slice::<Vec<serde_json::Value>>(data) else {
        return;
    };
    let Ok(frame) = EventFrame::from_json_records(&records) else {
        return;
    };
    if frame.column_index("ts").is_err() {
        return;
    }

    let group_by: Vec<&str> = frame
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| *c == "id")
        .collect();

    if let Ok(result) = aggregate(&frame, &group_by, "ts", 60, WeekStart::Monday, true) {
        let report = result.report.clone();
        assert_eq!(report.used_rows + report.dropped_rows(), report.total_rows);
        if let Ok(wide) = result.into_wide() {
            let total: u64 = wide.row_sums().iter().sum();
            assert_eq!(total as usize, report.used_rows);
        }
    }
});
