//! Small statistics helpers shared by the fitters and the quality scoring.

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Minimum and maximum of a non-empty slice.
pub fn min_max(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    (lo, hi)
}

/// Sum of squared residuals between observations and predictions.
pub fn sum_squared_residuals(ys: &[f64], predicted: &[f64]) -> f64 {
    ys.iter()
        .zip(predicted)
        .map(|(y, p)| (y - p) * (y - p))
        .sum()
}

/// Coefficient of determination `1 - SSres/SStot`.
///
/// When the observations have (numerically) no variance the ratio is
/// undefined; we report 1 if the predictions also match and 0 otherwise,
/// so a constant-data fit is only "perfect" when it actually reproduces
/// the constant.
pub fn r_squared(ys: &[f64], predicted: &[f64]) -> f64 {
    let ss_res = sum_squared_residuals(ys, predicted);
    let m = mean(ys);
    let ss_tot: f64 = ys.iter().map(|y| (y - m) * (y - m)).sum();
    if ss_tot < 1e-12 {
        return if ss_res < 1e-12 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_dev_basics() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v) - 5.0).abs() < 1e-12);
        assert!((std_dev(&v) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn perfect_prediction_scores_one() {
        let ys = [1.0, 2.0, 3.0];
        assert!((r_squared(&ys, &ys) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mean_prediction_scores_zero() {
        let ys = [1.0, 2.0, 3.0];
        let preds = [2.0, 2.0, 2.0];
        assert!(r_squared(&ys, &preds).abs() < 1e-12);
    }

    #[test]
    fn worse_than_mean_goes_negative() {
        let ys = [1.0, 2.0, 3.0];
        let preds = [3.0, 2.0, 1.0];
        assert!(r_squared(&ys, &preds) < 0.0);
    }

    #[test]
    fn constant_data_is_perfect_only_when_matched() {
        let ys = [5.0, 5.0, 5.0];
        assert!((r_squared(&ys, &[5.0, 5.0, 5.0]) - 1.0).abs() < 1e-12);
        assert!(r_squared(&ys, &[4.0, 5.0, 6.0]).abs() < 1e-12);
    }
}
