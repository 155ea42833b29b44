//! Command-line parsing for the percolation scaling analysis.
//!
//! Parsing lives here; `app` turns the parsed arguments into an
//! `AnalysisConfig` and dispatches.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "perc",
    version,
    about = "Finite-size scaling of cluster statistics in random-graph percolation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Average trial files, slice both statistics at the target c and fit N^a.
    Analyze(AnalyzeArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
    /// Write synthetic trial files with planted exponents.
    Synth(SynthArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Trial files, one per system size. Defaults to n1000.txt .. n1000000.txt
    /// in $PERC_DATA_DIR (or the current directory).
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// System size of each input, in order. Inferred from `n<N>` file names when omitted.
    #[arg(long = "size", value_name = "N")]
    pub sizes: Vec<u64>,

    /// Control parameter value to slice at.
    #[arg(long, default_value_t = 1.0)]
    pub target: f64,

    /// Match `|c - target| <= EPS` instead of exact equality.
    #[arg(long, value_name = "EPS")]
    pub tolerance: Option<f64>,

    /// Locate the third file's rows with the second file's c column.
    #[arg(long)]
    pub legacy_row_lookup: bool,

    /// Fixed starting exponent (default: log-log slope).
    #[arg(long, value_name = "A")]
    pub initial_guess: Option<f64>,

    /// Levenberg-Marquardt iteration budget.
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write the four-panel diagnostic figure as SVG.
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,

    /// Export series points with fitted values and residuals to CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Export fits (exponents + points + fitted grid) to JSON.
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved fit file.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Fit JSON file produced by `perc analyze --export-json`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args)]
pub struct SynthArgs {
    /// Directory receiving the `n<N>.txt` files.
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    #[arg(long, value_delimiter = ',', default_values_t = [1000u64, 10_000, 100_000, 1_000_000])]
    pub sizes: Vec<u64>,

    /// Trial blocks per file.
    #[arg(long, default_value_t = 10)]
    pub trials: usize,

    /// Rows per trial block (c = 0.02 * i).
    #[arg(long, default_value_t = 100)]
    pub points: usize,

    /// Planted exponent of the mean-cluster size at c = 1.
    #[arg(long, default_value_t = 1.0 / 3.0, allow_negative_numbers = true)]
    pub exponent_mean: f64,

    /// Planted exponent of the max-cluster fraction at c = 1.
    #[arg(long, default_value_t = -1.0 / 3.0, allow_negative_numbers = true)]
    pub exponent_max: f64,

    /// Relative Gaussian noise per value.
    #[arg(long, default_value_t = 0.02)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
