//! Numerically stable primitives for log-domain and summation math.

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        sum += (*v - max).exp();
    }
    max + sum.ln()
}

/// Normalize log-weights into probabilities that sum to 1.
///
/// Returns None when every weight is -inf or any weight is NaN.
pub fn normalize_log_probs(log_weights: &[f64]) -> Option<Vec<f64>> {
    let lse = log_sum_exp(log_weights);
    if !lse.is_finite() {
        return None;
    }
    Some(log_weights.iter().map(|w| (w - lse).exp()).collect())
}

/// Compensated (Neumaier) summation.
///
/// Keeps row sums of long, mixed-magnitude rows accurate to well under the
/// tolerances used for probability checks.
pub fn compensated_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Sum that does not depend on the order of `values`.
///
/// Values are summed in ascending total order, so any permutation of the same
/// multiset gives a bit-identical result.
pub fn order_independent_sum(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    compensated_sum(values)
}
