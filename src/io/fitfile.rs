//! Read/write fit JSON files.
//!
//! A fit JSON file is the "portable" representation of a run:
//! - the target control parameter
//! - per statistic: fitted exponent + variance + diagnostics
//! - the series points the fit was computed from
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitFile, FitGrid, PowerLawFit, Series, StatisticFit};
use crate::error::{AppError, ErrorKind};
use crate::models::log_grid;

const GRID_POINTS: usize = 101;

/// Assemble the JSON document for a set of fitted series.
pub fn build_fit_file(target: f64, fits: &[(Series, PowerLawFit)]) -> FitFile {
    let fits = fits
        .iter()
        .map(|(series, fit)| {
            let (lo, hi) = size_range(series);
            let (size, value) = log_grid(fit.exponent, lo, hi, GRID_POINTS).into_iter().unzip();
            StatisticFit {
                statistic: series.statistic,
                fit: fit.clone(),
                points: series.points.clone(),
                grid: FitGrid { size, value },
            }
        })
        .collect();

    FitFile {
        tool: "perc".to_string(),
        target,
        fits,
    }
}

/// Serialize a fit file as pretty-printed JSON.
pub fn fit_json(fit_file: &FitFile) -> Result<String, AppError> {
    serde_json::to_string_pretty(fit_file)
        .map_err(|e| AppError::new(ErrorKind::Format, format!("Failed to serialize fit JSON: {e}")))
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to open fit JSON '{}': {e}", path.display()),
        )
    })?;
    let fit_file: FitFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("Invalid fit JSON: {e}")))?;
    Ok(fit_file)
}

fn size_range(series: &Series) -> (f64, f64) {
    let lo = series.points.iter().map(|p| p.size).min().unwrap_or(1) as f64;
    let hi = series.points.iter().map(|p| p.size).max().unwrap_or(1) as f64;
    (lo, hi)
}
