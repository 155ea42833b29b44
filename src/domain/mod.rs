//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - numeric tables and per-file datasets (`Table`, `Dataset`)
//! - cross-size series (`Series`, `SeriesPoint`)
//! - fit outputs (`PowerLawFit`, `FitFile`) and run configuration

pub mod types;

pub use types::*;
