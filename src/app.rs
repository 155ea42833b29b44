//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments into an `AnalysisConfig`
//! - runs the pipeline and prints the report and plots
//! - writes the optional SVG and exports once every output has been rendered

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::cli::{AnalyzeArgs, Command, PlotArgs, SynthArgs};
use crate::data::{SynthConfig, write_synthetic_set};
use crate::domain::{AnalysisConfig, InitialGuess, RowLookup, Statistic, Tolerance};
use crate::error::{AppError, ErrorKind};
use crate::io::{StagedOutputs, size_from_path};
use crate::plot::Scale;

pub mod pipeline;

/// Directory holding the default input files.
pub const DATA_DIR_ENV: &str = "PERC_DATA_DIR";

/// Default inputs, one per system size.
pub const DEFAULT_INPUTS: [&str; 4] = ["n1000.txt", "n10000.txt", "n100000.txt", "n1000000.txt"];

/// Entry point for the `perc` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `perc`, `perc --target 0.5` and `perc data/n*.txt` all mean `perc analyze ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Plot(args) => handle_plot(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let data_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    let config = analysis_config_from_args(&args, data_dir.as_deref())?;
    analyze(&config, &mut std::io::stdout().lock())
}

/// Run the analysis, print the report to `out`, and write the requested files.
///
/// Every output is rendered and staged before anything is printed or any
/// destination file is replaced, so a failing run leaves no partial output.
pub fn analyze<W: Write>(config: &AnalysisConfig, out: &mut W) -> Result<(), AppError> {
    let run = pipeline::run_analysis(config)?;

    let mut text = crate::report::format_run_summary(&run, config);
    if config.plot {
        let (w, h) = (config.plot_width, config.plot_height);
        for (statistic, y_scale) in [
            (Statistic::MeanCluster, Scale::Log),
            (Statistic::MaxCluster, Scale::Linear),
        ] {
            text.push('\n');
            text.push_str(&crate::plot::render_curves_plot(&run.datasets, statistic, y_scale, w, h));
        }
        for (series, fit) in &run.fits {
            text.push('\n');
            text.push_str(&crate::plot::render_series_plot(series, fit, w, h));
        }
    }

    let mut staged = StagedOutputs::default();
    if let Some(path) = &config.svg {
        let svg = crate::plot::render_diagnostics_svg(&run.datasets, &run.fits)?;
        staged.stage(path, svg.as_bytes())?;
    }
    if let Some(path) = &config.export_csv {
        staged.stage(path, crate::io::series_csv(&run.fits).as_bytes())?;
    }
    if let Some(path) = &config.export_json {
        let fit_file = crate::io::build_fit_file(config.target, &run.fits);
        staged.stage(path, crate::io::fit_json(&fit_file)?.as_bytes())?;
    }

    writeln!(out, "{text}")
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write report: {e}")))?;

    for path in staged.commit()? {
        info!(path = %path.display(), "wrote output");
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let fit_file = crate::io::read_fit_json(&args.fit)?;
    if fit_file.fits.is_empty() {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!("'{}' contains no fits.", args.fit.display()),
        ));
    }

    for fit in &fit_file.fits {
        println!(
            "{}",
            crate::plot::render_fit_file_plot(fit, args.width, args.height)
        );
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = SynthConfig {
        sizes: args.sizes,
        trials: args.trials,
        points: args.points,
        exponent_mean: args.exponent_mean,
        exponent_max: args.exponent_max,
        noise: args.noise,
        seed: args.seed,
    };
    let paths = write_synthetic_set(&args.out_dir, &config)?;
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}

/// Resolve CLI arguments into a pipeline configuration.
///
/// With no input files, the default inputs are looked up in `data_dir`
/// (or the working directory). Sizes come from `--size` when given and are
/// otherwise parsed from `n<N>` file names.
pub fn analysis_config_from_args(
    args: &AnalyzeArgs,
    data_dir: Option<&Path>,
) -> Result<AnalysisConfig, AppError> {
    let inputs: Vec<PathBuf> = if args.inputs.is_empty() {
        let dir = data_dir.unwrap_or(Path::new("."));
        DEFAULT_INPUTS.iter().map(|name| dir.join(name)).collect()
    } else {
        args.inputs.clone()
    };

    let sizes = if args.sizes.is_empty() {
        inputs
            .iter()
            .map(|p| {
                size_from_path(p).ok_or_else(|| {
                    AppError::new(
                        ErrorKind::Usage,
                        format!(
                            "Cannot infer N from '{}'; name it n<N>.txt or pass --size.",
                            p.display()
                        ),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    } else if args.sizes.len() == inputs.len() {
        args.sizes.clone()
    } else {
        return Err(AppError::new(
            ErrorKind::Usage,
            format!(
                "Got {} --size values for {} input files.",
                args.sizes.len(),
                inputs.len()
            ),
        ));
    };

    if args.sizes.contains(&0) {
        return Err(AppError::new(ErrorKind::Usage, "System sizes must be > 0."));
    }
    if !args.target.is_finite() {
        return Err(AppError::new(ErrorKind::Usage, "--target must be finite."));
    }

    let tolerance = match args.tolerance {
        None => Tolerance::Exact,
        Some(eps) if eps.is_finite() && eps >= 0.0 => Tolerance::Abs(eps),
        Some(eps) => {
            return Err(AppError::new(
                ErrorKind::Usage,
                format!("--tolerance must be finite and >= 0 (got {eps})."),
            ));
        }
    };

    let initial_guess = match args.initial_guess {
        None => InitialGuess::LogLog,
        Some(a0) if a0.is_finite() => InitialGuess::Fixed(a0),
        Some(a0) => {
            return Err(AppError::new(
                ErrorKind::Usage,
                format!("--initial-guess must be finite (got {a0})."),
            ));
        }
    };

    if args.max_iter == 0 {
        return Err(AppError::new(ErrorKind::Usage, "--max-iter must be > 0."));
    }

    Ok(AnalysisConfig {
        inputs,
        sizes,
        target: args.target,
        tolerance,
        row_lookup: if args.legacy_row_lookup {
            RowLookup::Legacy
        } else {
            RowLookup::Own
        },
        initial_guess,
        max_iter: args.max_iter,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        svg: args.svg.clone(),
        export_csv: args.export_csv.clone(),
        export_json: args.export_json.clone(),
    })
}

/// Rewrite argv so `perc` defaults to `perc analyze`.
///
/// Rules:
/// - `perc`                      -> `perc analyze`
/// - `perc --target 0.5 ...`     -> `perc analyze --target 0.5 ...`
/// - `perc n1000.txt ...`        -> `perc analyze n1000.txt ...`
/// - `perc --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "plot" | "synth");
    if is_subcommand {
        return argv;
    }

    // A flag or a file path: both belong to `analyze`.
    argv.insert(1, "analyze".to_string());
    argv
}
