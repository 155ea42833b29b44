//! Formatted terminal output for an analysis run.
//!
//! Formatting lives here so the pipeline stays free of presentation, and
//! output changes stay local.

use crate::app::pipeline::RunOutput;
use crate::domain::{AnalysisConfig, Dataset, PowerLawFit, RowLookup, Series, Tolerance};

/// Format the full run summary (datasets + series + fit diagnostics).
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== perc - finite-size scaling at fixed c ===\n");
    out.push_str(&format!(
        "Target: c = {} ({})\n",
        config.target,
        fmt_tolerance(config.tolerance)
    ));
    if config.row_lookup == RowLookup::Legacy {
        out.push_str("Row lookup: legacy (third file uses the second file's c column)\n");
    }

    out.push_str("\nDatasets:\n");
    out.push_str(&format_datasets(&run.datasets));

    for (series, fit) in &run.fits {
        out.push('\n');
        out.push_str(&format_fit(series, fit));
    }

    out
}

fn format_datasets(datasets: &[Dataset]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>10} {:>7} {:>11}  {}\n", "N", "trials", "shape", "file"));
    out.push_str(&format!("{:-<10} {:-<7} {:-<11}  {:-<4}\n", "", "", "", ""));
    for ds in datasets {
        let shape = format!("{}x{}", ds.averaged.nrows(), ds.averaged.ncols());
        out.push_str(&format!(
            "{:>10} {:>7} {:>11}  {}\n",
            ds.size,
            ds.trials,
            shape,
            ds.path.display()
        ));
    }
    out
}

/// Format one fitted series: points, fitted values, and the exponent estimate.
pub fn format_fit(series: &Series, fit: &PowerLawFit) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} at c = {}: a = {}\n",
        series.statistic.display_name(),
        series.target,
        fmt_exponent(fit)
    ));
    out.push_str(&format!(
        "  SSE={:.6e} RMSE={:.6e} iterations={} n={}\n",
        fit.quality.sse, fit.quality.rmse, fit.quality.iterations, fit.quality.n
    ));

    out.push_str(&format!(
        "  {:>10} {:>14} {:>14} {:>14}\n",
        "N", "value", "fitted", "residual"
    ));
    for p in &series.points {
        let fitted = fit.predict(p.size as f64);
        out.push_str(&format!(
            "  {:>10} {:>14.6} {:>14.6} {:>14.6}\n",
            p.size,
            p.value,
            fitted,
            p.value - fitted
        ));
    }

    out
}

fn fmt_exponent(fit: &PowerLawFit) -> String {
    match fit.std_error() {
        Some(se) => format!("{:.6} ± {:.6}", fit.exponent, se),
        None => format!("{:.6} (variance unavailable)", fit.exponent),
    }
}

fn fmt_tolerance(tolerance: Tolerance) -> String {
    match tolerance {
        Tolerance::Exact => "exact match".to_string(),
        Tolerance::Abs(eps) => format!("|c - target| <= {eps}"),
    }
}
