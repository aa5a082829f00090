//! Wide and long representations of weekly histograms.
//!
//! - `WideMatrix`: one row per group, always exactly 7H columns
//! - `LongFrame`: one row per (group, day, bin), zero rows optional
//! - `convert`: the transforms between them

pub mod convert;
pub mod long;
pub mod wide;

pub use convert::{
    dataframe_to_long_format, wide_row_to_long, wide_to_long, widen, widen_with_groups,
};
pub use long::{LongFrame, LongRow};
pub use wide::{PersistedWide, WideMatrix};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A histogram cell value: integer counts or floating weight sums.
pub trait CellValue:
    Copy + Default + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn to_f64(self) -> f64;

    /// Finite and nonnegative.
    fn is_valid(self) -> bool;

    /// Sum that does not depend on the order of `values`.
    fn total(values: &mut [Self]) -> Self;
}

impl CellValue for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn is_valid(self) -> bool {
        true
    }

    fn total(values: &mut [Self]) -> Self {
        values.iter().sum()
    }
}

impl CellValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn is_valid(self) -> bool {
        self.is_finite() && self >= 0.0
    }

    fn total(values: &mut [Self]) -> Self {
        lc_math::order_independent_sum(values)
    }
}
