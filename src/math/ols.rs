//! Least squares solver.
//!
//! Two small linear problems show up in this project:
//!
//! ```text
//! minimize ‖X β − y‖²                  (log-log seed:  ln y = β0 + β1 ln N)
//! solve    (JᵀJ + λ D) δ = Jᵀ r         (each Levenberg–Marquardt step)
//! ```
//!
//! Both are solved with SVD so the same routine copes with tall design
//! matrices and with the nearly singular normal equations that appear when the
//! damping term is tiny.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 || x.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Ordinary least squares line `y = intercept + slope * x`.
///
/// Returns `(intercept, slope)`, or `None` if fewer than two distinct `x` values are given.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len();
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { x[i] });
    let rhs = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &rhs)?;

    // A rank-deficient design (all x equal) yields a minimum-norm solution
    // rather than an error; reject it explicitly.
    let spread = x.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
        - x.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    if spread <= 0.0 {
        return None;
    }
    Some((beta[0], beta[1]))
}
