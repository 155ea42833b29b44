//! The analysis pipeline shared by the `analyze` command and the tests.
//!
//! load trials -> average -> slice at the target c -> fit N^a per statistic
//!
//! Presentation (report, plots, exports) happens in `app` once this returns.

use std::path::Path;

use tracing::info;

use crate::domain::{AnalysisConfig, Dataset, PowerLawFit, Series, Statistic};
use crate::error::{AppError, ErrorKind};
use crate::fit::{FitOptions, LmSettings, fit_power_law};
use crate::io::load_trials;
use crate::math::mean_tables;
use crate::slice::build_series;

/// All computed outputs of a single `perc analyze` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub datasets: Vec<Dataset>,
    pub fits: Vec<(Series, PowerLawFit)>,
}

/// Load one trial file and average its blocks.
pub fn load_dataset(path: &Path, size: u64) -> Result<Dataset, AppError> {
    let tables = load_trials(path)?;
    let averaged = mean_tables(&tables)
        .map_err(|e| AppError::new(e.kind(), format!("{}: {e}", path.display())))?;

    info!(
        path = %path.display(),
        size,
        trials = tables.len(),
        rows = averaged.nrows(),
        cols = averaged.ncols(),
        "averaged trials"
    );

    Ok(Dataset {
        size,
        path: path.to_path_buf(),
        trials: tables.len(),
        averaged,
    })
}

/// Execute the full analysis and return the computed outputs.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    if config.inputs.len() != config.sizes.len() {
        return Err(AppError::new(
            ErrorKind::Usage,
            format!(
                "Got {} input files but {} sizes.",
                config.inputs.len(),
                config.sizes.len()
            ),
        ));
    }

    let datasets = config
        .inputs
        .iter()
        .zip(&config.sizes)
        .map(|(path, &size)| load_dataset(path, size))
        .collect::<Result<Vec<_>, _>>()?;

    let opts = FitOptions {
        initial_guess: config.initial_guess,
        lm: LmSettings {
            max_iter: config.max_iter,
            ..LmSettings::default()
        },
    };

    let mut fits = Vec::with_capacity(Statistic::ALL.len());
    for statistic in Statistic::ALL {
        let series = build_series(
            &datasets,
            statistic,
            config.target,
            config.tolerance,
            config.row_lookup,
        )?;
        let fit = fit_power_law(&series, &opts)?;
        info!(
            statistic = statistic.key(),
            exponent = fit.exponent,
            std_error = fit.std_error(),
            "fitted power law"
        );
        fits.push((series, fit));
    }

    Ok(RunOutput { datasets, fits })
}
