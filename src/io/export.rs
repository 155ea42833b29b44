//! Export fitted series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fmt::Write;

use crate::domain::{PowerLawFit, Series};

/// Render one CSV row per series point: observed value, fitted value, residual.
pub fn series_csv(fits: &[(Series, PowerLawFit)]) -> String {
    let mut out = String::new();
    out.push_str("statistic,target,size,value,fitted,residual,exponent\n");

    for (series, fit) in fits {
        for p in &series.points {
            let fitted = fit.predict(p.size as f64);
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{},{},{},{:.10},{:.10},{:.10},{:.10}",
                series.statistic.key(),
                series.target,
                p.size,
                p.value,
                fitted,
                p.value - fitted,
                fit.exponent,
            );
        }
    }

    out
}
