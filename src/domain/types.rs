//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - passed stage to stage through the pipeline without shared state
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// A 2-D numeric table: rows are samples, column 0 is the control parameter `c`.
///
/// Used both for a single trial block and for the averaged table of a file.
pub type Table = DMatrix<f64>;

/// Cluster-size statistic recorded in the value columns of each table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Statistic {
    /// Mean cluster size with the giant component removed (column 1).
    MeanCluster,
    /// Largest cluster size as a fraction of N (column 2).
    MaxCluster,
}

impl Statistic {
    pub const ALL: [Statistic; 2] = [Statistic::MeanCluster, Statistic::MaxCluster];

    /// Column index of this statistic in a trial table.
    pub fn column(self) -> usize {
        match self {
            Statistic::MeanCluster => 1,
            Statistic::MaxCluster => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Statistic::MeanCluster => "S'mean",
            Statistic::MaxCluster => "Smax",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Statistic::MeanCluster => "mean-cluster",
            Statistic::MaxCluster => "max-cluster",
        }
    }
}

/// One input file after loading and averaging.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// System size N the file was simulated at.
    pub size: u64,
    pub path: PathBuf,
    /// Number of trial blocks that were averaged.
    pub trials: usize,
    pub averaged: Table,
}

/// A `(N, value)` pair taken from one dataset at the target control parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub size: u64,
    pub value: f64,
}

/// Cross-size series of one statistic, ordered by N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub statistic: Statistic,
    pub target: f64,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn sizes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.size as f64).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// How column 0 is compared against the target control parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Tolerance {
    /// `c == target`, bit-for-bit float equality.
    #[default]
    Exact,
    /// `|c - target| <= eps`.
    Abs(f64),
}

/// Which dataset's column 0 locates the rows of each dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLookup {
    /// Every dataset is searched with its own control-parameter column.
    #[default]
    Own,
    /// The third dataset is searched with the second dataset's column.
    ///
    /// Reproduces historical results computed with that cross-file lookup.
    Legacy,
}

impl RowLookup {
    /// Index of the dataset whose column 0 is used when selecting from dataset `idx`.
    pub fn mask_source(self, idx: usize) -> usize {
        match self {
            RowLookup::Own => idx,
            RowLookup::Legacy if idx == 2 => 1,
            RowLookup::Legacy => idx,
        }
    }
}

/// Starting exponent for the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InitialGuess {
    /// Slope of the OLS line through `(ln N, ln value)`; `1.0` if any value is non-positive.
    #[default]
    LogLog,
    Fixed(f64),
}

/// Goodness-of-fit diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub iterations: usize,
    pub n: usize,
}

/// Fitted power law `value = N^exponent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    pub exponent: f64,
    /// Estimated variance of the exponent; `None` when it cannot be estimated.
    pub variance: Option<f64>,
    pub quality: FitQuality,
}

impl PowerLawFit {
    pub fn std_error(&self) -> Option<f64> {
        self.variance.filter(|v| v.is_finite() && *v >= 0.0).map(f64::sqrt)
    }

    pub fn predict(&self, size: f64) -> f64 {
        crate::models::predict(size, self.exponent)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `PERC_DATA_DIR`).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub inputs: Vec<PathBuf>,
    /// System size of each input, parallel to `inputs`.
    pub sizes: Vec<u64>,
    pub target: f64,
    pub tolerance: Tolerance,
    pub row_lookup: RowLookup,
    pub initial_guess: InitialGuess,
    pub max_iter: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub svg: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// Portable JSON representation of a run's fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub target: f64,
    pub fits: Vec<StatisticFit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticFit {
    pub statistic: Statistic,
    pub fit: PowerLawFit,
    pub points: Vec<SeriesPoint>,
    pub grid: FitGrid,
}

/// Fitted curve sampled on a log-spaced size grid, for quick plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub size: Vec<f64>,
    pub value: Vec<f64>,
}
