//! Aggregate calculator for numeric ratings.

/// Mean of `values` rounded to two decimals, or `None` for an empty slice.
///
/// ```
/// use moocho_engine::calculate_average;
///
/// assert_eq!(calculate_average(&[]), None);
/// assert_eq!(calculate_average(&[3.0, 7.0]), Some(5.0));
/// assert_eq!(calculate_average(&[7.0, 8.0, 8.0]), Some(7.67));
/// ```
pub fn calculate_average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(round2(sum / values.len() as f64))
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
