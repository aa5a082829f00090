//! Probability-simplex helpers for topic and timeslot distributions.

use super::stable::compensated_sum;

/// Default tolerance for "sums to one" checks.
pub const SIMPLEX_TOL: f64 = 1e-9;

/// Divide `values` by their sum.
///
/// Returns None if the sum is zero or not finite, or any value is negative.
pub fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    if values.iter().any(|v| v.is_nan() || *v < 0.0) {
        return None;
    }
    let total = compensated_sum(values);
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / total).collect())
}

/// Whether `values` is a probability vector within `tol`.
pub fn is_distribution(values: &[f64], tol: f64) -> bool {
    if values.is_empty() {
        return false;
    }
    if values.iter().any(|v| !v.is_finite() || *v < -tol) {
        return false;
    }
    (compensated_sum(values) - 1.0).abs() <= tol
}
