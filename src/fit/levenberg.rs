//! Levenberg–Marquardt minimization of a sum of squared residuals.
//!
//! Given residuals `r(p) = y − f(p)` and the model Jacobian `J = ∂f/∂p`, each
//! iteration solves the damped Gauss–Newton system as the augmented least
//! squares problem
//!
//! ```text
//! minimize ‖ [ J        ] δ − [ r ] ‖²
//!          ‖ [ √λ · D   ]     [ 0 ] ‖
//! ```
//!
//! with `D = diag(‖J_k‖)` (Marquardt scaling). A step that lowers the cost is
//! accepted and relaxes λ; a rejected step stiffens λ and is retried.
//!
//! Convergence is declared when any of these hold:
//! - the cost is exactly zero
//! - the relative cost reduction of an accepted step is below `ftol`
//! - the proposed step is below `xtol` relative to the parameter norm

use nalgebra::{DMatrix, DVector};

use crate::error::{AppError, ErrorKind};
use crate::math::solve_least_squares;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;

/// Iteration budget and tolerances.
#[derive(Debug, Clone, Copy)]
pub struct LmSettings {
    pub max_iter: usize,
    pub ftol: f64,
    pub xtol: f64,
}

impl Default for LmSettings {
    fn default() -> Self {
        Self {
            max_iter: 200,
            ftol: 1e-14,
            xtol: 1e-12,
        }
    }
}

/// Converged optimizer state.
#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: DVector<f64>,
    /// Sum of squared residuals at `params`.
    pub cost: f64,
    /// Model Jacobian at `params`.
    pub jacobian: DMatrix<f64>,
    pub iterations: usize,
}

/// Minimize `‖residuals(p)‖²` starting from `p0`.
///
/// `jacobian` must return `∂f/∂p` of the *model* (so that `∂r/∂p = −J`).
pub fn minimize<R, J>(
    p0: DVector<f64>,
    residuals: R,
    jacobian: J,
    settings: &LmSettings,
) -> Result<LmSolution, AppError>
where
    R: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    let mut p = p0;
    let mut r = residuals(&p);
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(AppError::new(
            ErrorKind::FitConvergence,
            "Residuals are not finite at the initial guess.",
        ));
    }

    let m = p.len();
    let mut lambda = LAMBDA_INIT;

    for iter in 1..=settings.max_iter {
        let j = jacobian(&p);
        if j.iter().any(|v| !v.is_finite()) {
            return Err(AppError::new(
                ErrorKind::FitConvergence,
                format!("Jacobian became non-finite at iteration {iter}."),
            ));
        }
        if cost == 0.0 {
            return Ok(LmSolution { params: p, cost, jacobian: j, iterations: iter - 1 });
        }

        let n = j.nrows();
        let scale: Vec<f64> = (0..m).map(|k| j.column(k).norm().max(f64::MIN_POSITIVE)).collect();

        loop {
            let sqrt_lambda = lambda.sqrt();
            let mut a = DMatrix::<f64>::zeros(n + m, m);
            a.rows_mut(0, n).copy_from(&j);
            for k in 0..m {
                a[(n + k, k)] = sqrt_lambda * scale[k];
            }
            let mut b = DVector::<f64>::zeros(n + m);
            b.rows_mut(0, n).copy_from(&r);

            let Some(delta) = solve_least_squares(&a, &b) else {
                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    return Err(stalled(iter));
                }
                continue;
            };

            let step_small = delta.norm() <= settings.xtol * (p.norm() + settings.xtol);
            let p_new = &p + &delta;
            let r_new = residuals(&p_new);
            let cost_new = r_new.norm_squared();

            if cost_new.is_finite() && cost_new <= cost {
                let reduction = cost - cost_new;
                p = p_new;
                r = r_new;
                cost = cost_new;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);

                if step_small || reduction <= settings.ftol * cost {
                    let j = jacobian(&p);
                    return Ok(LmSolution { params: p, cost, jacobian: j, iterations: iter });
                }
                break;
            }

            if step_small {
                // No representable improvement left around `p`.
                return Ok(LmSolution { params: p, cost, jacobian: j, iterations: iter });
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                return Err(stalled(iter));
            }
        }
    }

    Err(AppError::new(
        ErrorKind::FitConvergence,
        format!(
            "Optimizer did not converge within {} iterations (cost={cost:.6e}).",
            settings.max_iter
        ),
    ))
}

fn stalled(iter: usize) -> AppError {
    AppError::new(
        ErrorKind::FitConvergence,
        format!("Optimizer stalled at iteration {iter}: damping exceeded {LAMBDA_MAX:e}."),
    )
}
