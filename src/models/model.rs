//! Power-law model evaluation.
//!
//! The fitter relies on two primitive operations:
//! - predict `value(N) = N^a` (for residuals/plots)
//! - the derivative `∂value/∂a = N^a · ln N` (one Jacobian entry per point)

/// Predict `N^a`.
pub fn predict(size: f64, exponent: f64) -> f64 {
    size.powf(exponent)
}

/// Derivative of the prediction with respect to the exponent.
pub fn d_exponent(size: f64, exponent: f64) -> f64 {
    size.powf(exponent) * size.ln()
}

/// Sample the fitted curve on `n` log-spaced sizes spanning `[lo, hi]`.
///
/// Returns an empty grid when the bounds are not positive and increasing.
pub fn log_grid(exponent: f64, lo: f64, hi: f64, n: usize) -> Vec<(f64, f64)> {
    if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && hi > lo) {
        return Vec::new();
    }
    let n = n.max(2);
    let (l0, l1) = (lo.ln(), hi.ln());
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let size = (l0 + u * (l1 - l0)).exp();
            (size, predict(size, exponent))
        })
        .collect()
}
