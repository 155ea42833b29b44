//! Synthetic trial files with planted scaling exponents.
//!
//! The generated files follow the trial-file layout (`c`, mean-cluster,
//! max-cluster per row; one block per trial) so the whole pipeline can be
//! exercised without the simulator. The curves are not percolation physics;
//! they only guarantee that at `c = 1`:
//!
//! - mean-cluster ≈ `N^exponent_mean`
//! - max-cluster ≈ `N^exponent_max`
//!
//! up to the multiplicative Gaussian noise.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::error::{AppError, ErrorKind};

/// Spacing of the control-parameter grid (`c_i = STEP * i`).
pub const C_STEP: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub sizes: Vec<u64>,
    pub trials: usize,
    /// Rows per trial block.
    pub points: usize,
    pub exponent_mean: f64,
    pub exponent_max: f64,
    /// Relative standard deviation of the per-trial noise.
    pub noise: f64,
    pub seed: u64,
}

/// Write one `n<size>.txt` file per size into `out_dir` and return their paths.
pub fn write_synthetic_set(out_dir: &Path, config: &SynthConfig) -> Result<Vec<PathBuf>, AppError> {
    validate(config)?;
    create_dir_all(out_dir).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create output dir '{}': {e}", out_dir.display()),
        )
    })?;

    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(ErrorKind::Usage, format!("Noise distribution error: {e}")))?;

    let mut paths = Vec::with_capacity(config.sizes.len());
    for &size in &config.sizes {
        let path = out_dir.join(format!("n{size}.txt"));
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(size));
        write_file(&path, size, config, &normal, &mut rng)?;
        info!(path = %path.display(), size, trials = config.trials, "wrote synthetic trial file");
        paths.push(path);
    }
    Ok(paths)
}

fn validate(config: &SynthConfig) -> Result<(), AppError> {
    if config.sizes.is_empty() || config.sizes.contains(&0) {
        return Err(AppError::new(ErrorKind::Usage, "Sizes must be non-empty and > 0."));
    }
    if config.trials == 0 {
        return Err(AppError::new(ErrorKind::Usage, "Trial count must be > 0."));
    }
    // The grid must reach c = 1 (index 50).
    if config.points <= 50 {
        return Err(AppError::new(ErrorKind::Usage, "Points per trial must be > 50 so the grid reaches c = 1."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0 && config.noise < 0.5) {
        return Err(AppError::new(ErrorKind::Usage, "Noise must be within [0, 0.5)."));
    }
    if !(config.exponent_mean.is_finite() && config.exponent_max.is_finite()) {
        return Err(AppError::new(ErrorKind::Usage, "Exponents must be finite."));
    }
    Ok(())
}

fn write_file(
    path: &Path,
    size: u64,
    config: &SynthConfig,
    normal: &Normal<f64>,
    rng: &mut StdRng,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create '{}': {e}", path.display()),
        )
    })?;
    let mut out = BufWriter::new(file);
    let io_err = |e: std::io::Error| AppError::new(ErrorKind::Io, format!("Failed to write '{}': {e}", path.display()));

    let n = size as f64;
    for _ in 0..config.trials {
        for i in 0..config.points {
            let c = C_STEP * i as f64;
            let mean = mean_cluster(c, n, config.exponent_mean) * (1.0 + normal.sample(rng));
            let max = max_cluster(c, n, config.exponent_max) * (1.0 + normal.sample(rng));
            writeln!(out, "{c:.6}\t{mean:.6}\t{max:.6}").map_err(io_err)?;
        }
        writeln!(out).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;
    Ok(())
}

/// Peaked curve whose height at `c = 1` is `N^a`.
fn mean_cluster(c: f64, n: f64, a: f64) -> f64 {
    1.0 / ((c - 1.0).abs() + n.powf(-a))
}

/// Finite-size floor `N^a` below `c = 1`, linear growth above it, capped at 1.
fn max_cluster(c: f64, n: f64, a: f64) -> f64 {
    (n.powf(a) + 2.0 * (c - 1.0).max(0.0)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_trials;

    fn config() -> SynthConfig {
        SynthConfig {
            sizes: vec![1000, 10_000],
            trials: 3,
            points: 100,
            exponent_mean: 1.0 / 3.0,
            exponent_max: -1.0 / 3.0,
            noise: 0.01,
            seed: 42,
        }
    }

    #[test]
    fn files_load_back_with_expected_shape() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_synthetic_set(dir.path(), &config()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("n1000.txt"));

        let tables = load_trials(&paths[1]).unwrap();
        assert_eq!(tables.len(), 3);
        for t in &tables {
            assert_eq!(t.shape(), (100, 3));
            assert_eq!(t[(50, 0)], 1.0);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let pa = write_synthetic_set(a.path(), &config()).unwrap();
        let pb = write_synthetic_set(b.path(), &config()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&pa[0]).unwrap(),
            std::fs::read_to_string(&pb[0]).unwrap()
        );
    }

    #[test]
    fn planted_values_at_critical_point() {
        assert!((mean_cluster(1.0, 1e6, 0.5) - 1000.0).abs() < 1e-9);
        assert!((max_cluster(1.0, 1e6, -1.0 / 3.0) - 0.01).abs() < 1e-12);
        assert_eq!(max_cluster(1.9, 1e6, -1.0 / 3.0), 1.0);
    }

    #[test]
    fn invalid_config_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config();
        cfg.points = 10;
        let err = write_synthetic_set(dir.path(), &cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);

        let mut cfg = config();
        cfg.sizes = vec![];
        assert_eq!(write_synthetic_set(dir.path(), &cfg).unwrap_err().kind(), ErrorKind::Usage);
    }
}
