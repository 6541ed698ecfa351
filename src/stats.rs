//! Small descriptive statistics shared by the analyses.
//!
//! Non-finite inputs are ignored everywhere, the way missing cells are.

/// Arithmetic mean of the finite values, `None` when there are none.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        sum += v;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Median of the finite values (mean of the two middle values for even
/// counts), `None` when there are none.
pub fn median<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q` is clamped to [0, 1]. Returns `None` when no finite value exists.
pub fn quantile<I: IntoIterator<Item = f64>>(values: I, q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
