pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample (n - 1) standard deviation; zero below two values.
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let squared: f64 = values.iter().map(|value| (value - avg).powi(2)).sum();
    (squared / (values.len() - 1) as f64).sqrt()
}

/// Inclusive Tukey fences `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`, with quartiles taken
/// at `sorted[n / 4]` and `sorted[3n / 4]`. `None` below four values.
pub(crate) fn iqr_fences(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = sorted[n / 4];
    let q3 = sorted[(3 * n) / 4];
    let iqr = q3 - q1;
    Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_deviation() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0, 9.0]), Some(5.0));
        assert_eq!(sample_std_dev(&[3.0]), 0.0);
        assert!((sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.138089935).abs() < 1e-6);
    }

    #[test]
    fn fences_use_index_quartiles() {
        assert_eq!(iqr_fences(&[1.0, 2.0, 3.0]), None);
        // sorted: 1 2 3 4 5 6 7 100 -> Q1 = sorted[2] = 3, Q3 = sorted[6] = 7
        let (lower, upper) =
            iqr_fences(&[100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).expect("fences");
        assert_eq!(lower, -3.0);
        assert_eq!(upper, 13.0);
    }
}
