//! Fuzz target for persisted wide matrices.
//!
//! Loading should never panic; anything that loads has 7H columns.

#![no_main]

use lc_core::WideMatrix;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(wide) = WideMatrix::<f64>::from_json(data) {
        assert_eq!(wide.n_cols(), wide.grid().n_slots());
        for (_, row) in wide.iter_rows() {
            assert_eq!(row.len(), wide.n_cols());
        }
    }
});
