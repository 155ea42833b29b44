//! Power-law fit `value = N^a` for a cross-size series.
//!
//! Given:
//! - system sizes `N_i > 0`
//! - observed values `y_i`
//!
//! we minimize `Σ (y_i − N_i^a)²` over the single exponent `a` with
//! Levenberg–Marquardt, then estimate its variance from the Jacobian at the
//! optimum as `s² · (JᵀJ)⁻¹` with `s² = SSE / (n − 1)`.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{FitQuality, InitialGuess, PowerLawFit, Series};
use crate::error::{AppError, ErrorKind};
use crate::fit::levenberg::{LmSettings, minimize};
use crate::math::fit_line;
use crate::models::{d_exponent, predict};

/// Options that affect how the exponent is estimated.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    pub initial_guess: InitialGuess,
    pub lm: LmSettings,
}

/// Fit `value = N^a` to `series`.
pub fn fit_power_law(series: &Series, opts: &FitOptions) -> Result<PowerLawFit, AppError> {
    let sizes = series.sizes();
    let values = series.values();
    fit_points(&sizes, &values, opts)
        .map_err(|e| AppError::new(e.kind(), format!("{} fit: {e}", series.statistic.display_name())))
}

/// Fit `value = N^a` to parallel slices of sizes and values.
pub fn fit_points(sizes: &[f64], values: &[f64], opts: &FitOptions) -> Result<PowerLawFit, AppError> {
    validate(sizes, values)?;

    let a0 = initial_exponent(sizes, values, opts.initial_guess);
    let n = sizes.len();

    let residuals = |p: &DVector<f64>| {
        DVector::from_iterator(n, sizes.iter().zip(values).map(|(&s, &y)| y - predict(s, p[0])))
    };
    let jacobian = |p: &DVector<f64>| DMatrix::from_fn(n, 1, |i, _| d_exponent(sizes[i], p[0]));

    let sol = minimize(DVector::from_element(1, a0), residuals, jacobian, &opts.lm)?;
    let exponent = sol.params[0];
    if !exponent.is_finite() {
        return Err(AppError::new(ErrorKind::FitConvergence, "Fitted exponent is not finite."));
    }

    let variance = exponent_variance(&sol.jacobian, sol.cost, n);
    debug!(a0, exponent, sse = sol.cost, iterations = sol.iterations, "power-law fit converged");

    Ok(PowerLawFit {
        exponent,
        variance,
        quality: FitQuality {
            sse: sol.cost,
            rmse: (sol.cost / n as f64).sqrt(),
            iterations: sol.iterations,
            n,
        },
    })
}

fn validate(sizes: &[f64], values: &[f64]) -> Result<(), AppError> {
    if sizes.len() != values.len() {
        return Err(AppError::new(
            ErrorKind::ShapeMismatch,
            format!("{} sizes but {} values.", sizes.len(), values.len()),
        ));
    }
    if let Some(s) = sizes.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!("System size must be finite and > 0, got {s}."),
        ));
    }
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!("Series value must be finite, got {v}."),
        ));
    }

    let mut distinct = sizes.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!(
                "Need at least 2 distinct system sizes to fit an exponent, got {}.",
                distinct.len()
            ),
        ));
    }
    Ok(())
}

fn initial_exponent(sizes: &[f64], values: &[f64], guess: InitialGuess) -> f64 {
    match guess {
        InitialGuess::Fixed(a0) => a0,
        InitialGuess::LogLog => {
            if values.iter().any(|&v| v <= 0.0) {
                return 1.0;
            }
            let lx: Vec<f64> = sizes.iter().map(|s| s.ln()).collect();
            let ly: Vec<f64> = values.iter().map(|v| v.ln()).collect();
            // Only the slope seeds the optimizer; the intercept soaks up any prefactor.
            match fit_line(&lx, &ly) {
                Some((_, slope)) if slope.is_finite() => slope,
                _ => 1.0,
            }
        }
    }
}

fn exponent_variance(jacobian: &DMatrix<f64>, sse: f64, n: usize) -> Option<f64> {
    if n <= 1 {
        return None;
    }
    let jtj = jacobian.tr_mul(jacobian);
    let inv = jtj.try_inverse()?;
    let s2 = sse / (n - 1) as f64;
    let var = inv[(0, 0)] * s2;
    var.is_finite().then_some(var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SeriesPoint, Statistic};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    const SIZES: [f64; 4] = [1e3, 1e4, 1e5, 1e6];

    fn series(points: &[(u64, f64)]) -> Series {
        Series {
            statistic: Statistic::MeanCluster,
            target: 1.0,
            points: points.iter().map(|&(size, value)| SeriesPoint { size, value }).collect(),
        }
    }

    #[test]
    fn recovers_planted_exponent() {
        for &a in &[-0.5, 0.0, 1.0 / 3.0, 0.5, 1.0, 1.7] {
            let values: Vec<f64> = SIZES.iter().map(|&n| n.powf(a)).collect();
            let fit = fit_points(&SIZES, &values, &FitOptions::default()).unwrap();
            assert!((fit.exponent - a).abs() < 1e-6, "a={a} fit={}", fit.exponent);
            assert!(fit.quality.sse < 1e-12 * values.iter().map(|v| v * v).sum::<f64>().max(1.0));
        }
    }

    #[test]
    fn converges_from_unit_initial_guess() {
        let values: Vec<f64> = SIZES.iter().map(|&n| n.powf(2.0 / 3.0)).collect();
        let opts = FitOptions {
            initial_guess: InitialGuess::Fixed(1.0),
            ..FitOptions::default()
        };
        let fit = fit_points(&SIZES, &values, &opts).unwrap();
        assert!((fit.exponent - 2.0 / 3.0).abs() < 1e-6, "fit={}", fit.exponent);
        assert!(fit.quality.iterations > 0);
    }

    #[test]
    fn linear_series_fits_unit_exponent() {
        let s = series(&[(1000, 1000.0), (10_000, 10_000.0), (100_000, 100_000.0), (1_000_000, 1_000_000.0)]);
        let fit = fit_power_law(&s, &FitOptions::default()).unwrap();
        assert!((fit.exponent - 1.0).abs() < 1e-9);
        assert!(fit.std_error().unwrap() < 1e-9);
    }

    #[test]
    fn scaled_series_settles_on_least_squares_compromise() {
        // value = N / 1000 has a prefactor the model cannot express; the least
        // squares exponent is pulled towards the largest point (1e6^a ≈ 1000).
        let s = series(&[(1000, 1.0), (10_000, 10.0), (100_000, 100.0), (1_000_000, 1000.0)]);
        let fit = fit_power_law(&s, &FitOptions::default()).unwrap();
        assert!(fit.exponent > 0.45 && fit.exponent < 0.55, "fit={}", fit.exponent);

        let sse = |a: f64| -> f64 {
            s.points.iter().map(|p| (p.value - predict(p.size as f64, a)).powi(2)).sum()
        };
        assert!(sse(fit.exponent) <= sse(fit.exponent - 1e-3));
        assert!(sse(fit.exponent) <= sse(fit.exponent + 1e-3));
    }

    #[test]
    fn noisy_data_gives_nearby_exponent_with_error_bar() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 0.01).unwrap();
        let sizes: Vec<f64> = (0..12).map(|i| 10f64.powf(3.0 + i as f64 * 0.25)).collect();
        let values: Vec<f64> = sizes
            .iter()
            .map(|&n| n.powf(0.4) * (1.0 + noise.sample(&mut rng)))
            .collect();

        let fit = fit_points(&sizes, &values, &FitOptions::default()).unwrap();
        assert!((fit.exponent - 0.4).abs() < 0.01, "fit={}", fit.exponent);
        let se = fit.std_error().unwrap();
        assert!(se > 0.0 && se < 0.01, "se={se}");
    }

    #[test]
    fn fewer_than_two_points_is_insufficient_data() {
        let err = fit_points(&[1000.0], &[10.0], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let err = fit_points(&[], &[], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn repeated_size_does_not_count_as_distinct() {
        let err = fit_points(&[1000.0, 1000.0], &[10.0, 11.0], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let err = fit_points(&[0.0, 10.0], &[1.0, 2.0], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        let err = fit_points(&[10.0, 100.0], &[1.0, f64::NAN], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn tiny_iteration_budget_is_convergence_error() {
        let values: Vec<f64> = SIZES.iter().map(|&n| n.powf(0.3)).collect();
        let opts = FitOptions {
            initial_guess: InitialGuess::Fixed(1.5),
            lm: LmSettings { max_iter: 1, ..LmSettings::default() },
        };
        let err = fit_points(&SIZES, &values, &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FitConvergence);
    }

    #[test]
    fn error_message_names_the_statistic() {
        let s = series(&[(1000, 1.0)]);
        let err = fit_power_law(&s, &FitOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("S'mean fit:"), "{err}");
    }
}
