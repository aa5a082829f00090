//! Row normalizations and vocabulary reductions of wide matrices.
//!
//! Rows whose divisor is zero stay all-zero instead of becoming NaN.

use lc_common::{Error, GroupKey, Result, DAYS_IN_WEEK};
use lc_math::Matrix;
use serde::{Deserialize, Serialize};

use crate::frame::{CellValue, WideMatrix};

/// Axis to collapse the vocabulary onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabAxis {
    /// 7 columns, one per day.
    Dow,
    /// H columns, one per bin of the day.
    Hour,
}

impl std::str::FromStr for VocabAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dow" | "day" => Ok(VocabAxis::Dow),
            "hour" | "bin" => Ok(VocabAxis::Hour),
            _ => Err(Error::invalid("aggregation", format!("expected dow or hour, got {}", s))),
        }
    }
}

/// A matrix with group rows and arbitrary labeled columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledMatrix {
    pub groups: Vec<GroupKey>,
    pub columns: Vec<String>,
    pub values: Matrix,
}

impl LabeledMatrix {
    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        let c = self.columns.iter().position(|l| l == label)?;
        Some(self.values.iter_rows().map(|row| row[c]).collect())
    }
}

fn scale_rows<T: CellValue>(wide: &WideMatrix<T>, divisor: impl Fn(&[f64]) -> f64) -> WideMatrix<f64> {
    let mut out = wide.to_f64();
    let n = out.n_cols();
    let mut scaled = Vec::with_capacity(out.as_slice().len());
    for row in out.as_slice().chunks(n) {
        let d = divisor(row);
        if d > 0.0 {
            scaled.extend(row.iter().map(|v| v / d));
        } else {
            scaled.extend(std::iter::repeat(0.0).take(row.len()));
        }
    }
    out.replace_values(scaled);
    out
}

fn row_total(row: &[f64]) -> f64 {
    lc_math::order_independent_sum(&mut row.to_vec())
}

/// Each row divided by its maximum.
pub fn divide_by_max<T: CellValue>(wide: &WideMatrix<T>) -> WideMatrix<f64> {
    scale_rows(wide, |row| row.iter().cloned().fold(0.0, f64::max))
}

/// Each row divided by its sum: a probability distribution over slots.
pub fn divide_by_sum<T: CellValue>(wide: &WideMatrix<T>) -> WideMatrix<f64> {
    scale_rows(wide, row_total)
}

/// Every value multiplied by the number of slots.
///
/// Applied to probabilities (e.g. after [`divide_by_sum`]), 1.0 marks a slot
/// at the even rate `1 / 7H`. Other rows are scaled as they are.
pub fn divide_by_even_rate<T: CellValue>(wide: &WideMatrix<T>) -> WideMatrix<f64> {
    let mut out = wide.to_f64();
    let n = out.n_cols() as f64;
    let scaled = out.as_slice().iter().map(|v| v * n).collect();
    out.replace_values(scaled);
    out
}

/// Each slot divided by the total of its day, so every non-empty day sums
/// to 1.
pub fn conditional_probabilities<T: CellValue>(wide: &WideMatrix<T>) -> WideMatrix<f64> {
    let mut out = wide.to_f64();
    let per_day = out.grid().slots_per_day();
    let mut scaled = Vec::with_capacity(out.as_slice().len());
    for day in out.as_slice().chunks(per_day) {
        let total = row_total(day);
        if total > 0.0 {
            scaled.extend(day.iter().map(|v| v / total));
        } else {
            scaled.extend(std::iter::repeat(0.0).take(day.len()));
        }
    }
    out.replace_values(scaled);
    out
}

/// Collapse the vocabulary to day-of-week or bin-of-day totals.
pub fn sum_over_vocab<T: CellValue>(wide: &WideMatrix<T>, axis: VocabAxis) -> LabeledMatrix {
    let grid = *wide.grid();
    let per_day = grid.slots_per_day();
    let columns: Vec<String> = match axis {
        VocabAxis::Dow => (0..DAYS_IN_WEEK).map(|d| format!("{:02}", d)).collect(),
        VocabAxis::Hour => (0..per_day)
            .map(|b| format!("{:0width$}", b, width = grid.token_width()))
            .collect(),
    };

    let mut values = Matrix::zeros(wide.n_rows(), columns.len());
    for (r, (_, row)) in wide.iter_rows().enumerate() {
        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
        for (col, value) in row.iter().enumerate() {
            let bucket = match axis {
                VocabAxis::Dow => col / per_day,
                VocabAxis::Hour => col % per_day,
            };
            buckets[bucket].push(value.to_f64());
        }
        for (c, mut bucket) in buckets.into_iter().enumerate() {
            values.row_mut(r)[c] = lc_math::order_independent_sum(&mut bucket);
        }
    }

    LabeledMatrix {
        groups: wide.groups().to_vec(),
        columns,
        values,
    }
}

/// Rolling forward sum over the circular week.
///
/// Slot `i` becomes the total of the `hours`-long window starting at `i`,
/// wrapping from the end of the week back to its start. `hours = 1` on an
/// hourly grid is the identity. The window must cover a whole number of
/// bins.
pub fn sum_next_hours<T: CellValue>(wide: &WideMatrix<T>, hours: u32) -> Result<WideMatrix<f64>> {
    let bin = wide.grid().bin_minutes();
    let minutes = hours.saturating_mul(60);
    if hours == 0 || minutes % bin != 0 {
        return Err(Error::invalid(
            "hours",
            format!("{} hours is not a positive multiple of {} minute bins", hours, bin),
        ));
    }
    sum_next_slots(wide, (minutes / bin) as usize)
}

/// Rolling forward sum over `window` slots of the circular week.
pub fn sum_next_slots<T: CellValue>(wide: &WideMatrix<T>, window: usize) -> Result<WideMatrix<f64>> {
    let n = wide.n_cols();
    if window == 0 || window > n {
        return Err(Error::invalid(
            "window",
            format!("{} slots is outside [1, {}]", window, n),
        ));
    }
    let mut out = wide.to_f64();
    let mut summed = Vec::with_capacity(out.as_slice().len());
    for row in out.as_slice().chunks(n) {
        for start in 0..n {
            let mut window_values: Vec<f64> = (0..window).map(|k| row[(start + k) % n]).collect();
            summed.push(lc_math::order_independent_sum(&mut window_values));
        }
    }
    out.replace_values(summed);
    Ok(out)
}

/// Totals of each row over each segment: `wide @ segments^T`.
///
/// Segments are wide rows on the same grid, typically 0/1 masks.
pub fn sum_over_segments<T: CellValue, S: CellValue>(
    wide: &WideMatrix<T>,
    segments: &WideMatrix<S>,
) -> Result<LabeledMatrix> {
    if !wide.grid().compatible_with(segments.grid()) {
        return Err(Error::IncompatibleGrid(format!(
            "data uses {} minute bins ({}), segments use {} minute bins ({})",
            wide.grid().bin_minutes(),
            wide.grid().week_start(),
            segments.grid().bin_minutes(),
            segments.grid().week_start()
        )));
    }
    let values = wide
        .to_matrix()
        .matmul(&segments.to_matrix().transpose())
        .ok_or_else(|| Error::shape("sum_over_segments", wide.n_cols(), segments.n_cols()))?;
    Ok(LabeledMatrix {
        groups: wide.groups().to_vec(),
        columns: segments.groups().iter().map(|g| g.to_string()).collect(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarGrid;
    use lc_common::WeekStart;

    fn sample() -> WideMatrix<u64> {
        let grid = CalendarGrid::hourly();
        let mut a = vec![0u64; 168];
        a[9] = 2;
        a[24 + 14] = 1;
        a[167] = 1;
        WideMatrix::from_rows(
            grid,
            vec![(GroupKey::single("a"), a), (GroupKey::single("z"), vec![0; 168])],
        )
        .unwrap()
    }

    #[test]
    fn test_divide_by_sum_rows_are_distributions() {
        let probs = divide_by_sum(&sample());
        assert!(lc_math::is_distribution(probs.row(0), 1e-12));
        assert_eq!(probs.row(0)[9], 0.5);
        assert!(probs.row(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_divide_by_max() {
        let scaled = divide_by_max(&sample());
        assert_eq!(scaled.row(0)[9], 1.0);
        assert_eq!(scaled.row(0)[167], 0.5);
    }

    #[test]
    fn test_even_rate() {
        let even = divide_by_even_rate(&sample());
        assert_eq!(even.row(0)[9], 2.0 * 168.0);
        assert_eq!(even.row(0)[167], 168.0);
        assert!(even.row(1).iter().all(|v| *v == 0.0));

        // On probabilities the row total becomes the slot count
        let rates = divide_by_even_rate(&divide_by_sum(&sample()));
        assert!((rates.row(0)[9] - 84.0).abs() < 1e-9);
        let total: f64 = rates.row(0).iter().sum();
        assert!((total - 168.0).abs() < 1e-9);
    }

    #[test]
    fn test_conditional_probabilities_per_day() {
        let cond = conditional_probabilities(&sample());
        let monday: f64 = cond.row(0)[..24].iter().sum();
        let wednesday: f64 = cond.row(0)[48..72].iter().sum();
        assert!((monday - 1.0).abs() < 1e-12);
        assert_eq!(wednesday, 0.0);
        assert_eq!(cond.row(0)[24 + 14], 1.0);
    }

    #[test]
    fn test_sum_over_vocab() {
        let dow = sum_over_vocab(&sample(), VocabAxis::Dow);
        assert_eq!(dow.columns.len(), 7);
        assert_eq!(dow.values.row(0), &[2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

        let hour = sum_over_vocab(&sample(), VocabAxis::Hour);
        assert_eq!(hour.columns.len(), 24);
        assert_eq!(hour.column("09").unwrap(), vec![2.0, 0.0]);
        assert_eq!(hour.column("23").unwrap(), vec![1.0, 0.0]);
        assert_eq!("dow".parse::<VocabAxis>().unwrap(), VocabAxis::Dow);
        assert!("week".parse::<VocabAxis>().is_err());
    }

    #[test]
    fn test_sum_next_hours_wraps() {
        let summed = sum_next_hours(&sample(), 2).unwrap();
        // Sunday 23:00 window covers Monday 00:00
        assert_eq!(summed.row(0)[167], 1.0);
        assert_eq!(summed.row(0)[8], 2.0);
        assert_eq!(summed.row(0)[9], 2.0);
        assert_eq!(summed.row(0)[166], 1.0);

        let identity = sum_next_hours(&sample(), 1).unwrap();
        assert_eq!(identity, sample().to_f64());
    }

    #[test]
    fn test_sum_next_hours_validates_window() {
        assert!(sum_next_hours(&sample(), 0).is_err());
        let grid = CalendarGrid::new(120, WeekStart::Monday).unwrap();
        let wide = WideMatrix::<u64>::zeros(grid, vec![GroupKey::row(0)]).unwrap();
        assert!(sum_next_hours(&wide, 3).is_err());
        assert!(sum_next_hours(&wide, 4).is_ok());
    }

    #[test]
    fn test_sum_over_segments_requires_same_grid() {
        let sunday = CalendarGrid::hourly().with_week_start(WeekStart::Sunday);
        let segments = WideMatrix::<u64>::zeros(sunday, vec![GroupKey::single("s")]).unwrap();
        assert!(matches!(
            sum_over_segments(&sample(), &segments),
            Err(Error::IncompatibleGrid(_))
        ));
    }
}
