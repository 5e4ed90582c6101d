//! Summary statistics over plain `f64` slices.

/// Population mean and standard deviation.
///
/// Returns `None` for an empty slice.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Some((mean, variance.sqrt()))
}

/// Quantile at `percentile` (0-100) using linear interpolation between closest ranks.
///
/// `percentile` is clamped into `[0, 100]`. Returns `None` for an empty slice or a NaN
/// percentile.
pub fn percentile(values: &[f64], percentile: f64) -> Option<f64> {
    if values.is_empty() || percentile.is_nan() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = percentile.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
