//! Fuzz target for calendar configuration parsing.
//!
//! Parsing and validation should never panic, and any config that validates
//! must build a grid.

#![no_main]

use lc_config::{validate_calendar, CalendarConfig};
use lc_core::CalendarGrid;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    for parsed in [CalendarConfig::from_json_str(data), CalendarConfig::from_toml_str(data)] {
        if let Ok(config) = parsed {
            if validate_calendar(&config).is_ok() {
                assert!(CalendarGrid::from_config(&config).is_ok());
            }
        }
    }
});
