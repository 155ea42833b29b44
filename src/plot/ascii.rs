//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - fitted curve: `-` line
//! - series points: `o`
//! - averaged curves: one digit per dataset (`1`, `2`, ...)

use crate::domain::{Dataset, PowerLawFit, Series, Statistic, StatisticFit};
use crate::models::log_grid;

/// Axis scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

impl Scale {
    /// Map a data value onto the axis, dropping values the scale cannot show.
    pub fn apply(self, v: f64) -> Option<f64> {
        match self {
            Scale::Linear => v.is_finite().then_some(v),
            Scale::Log => (v.is_finite() && v > 0.0).then(|| v.log10()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scale::Linear => "",
            Scale::Log => "log10 ",
        }
    }
}

struct Layer<'a> {
    points: &'a [(f64, f64)],
    ch: char,
    line: bool,
}

/// Render a series with its fitted power law on log-log axes.
pub fn render_series_plot(series: &Series, fit: &PowerLawFit, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = series.sizes().into_iter().zip(series.values()).collect();
    let (lo, hi) = x_bounds(&points).unwrap_or((1.0, 10.0));
    let curve = log_grid(fit.exponent, lo, hi, width.max(2));

    let title = format!(
        "{} at c={} vs N | a={:.4}",
        series.statistic.display_name(),
        series.target,
        fit.exponent
    );
    render_plot(
        &title,
        &[
            Layer { points: &curve, ch: '-', line: true },
            Layer { points: &points, ch: 'o', line: false },
        ],
        (Scale::Log, Scale::Log),
        width,
        height,
    )
}

/// Render a saved statistic fit (points + precomputed grid) on log-log axes.
pub fn render_fit_file_plot(fit: &StatisticFit, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = fit.points.iter().map(|p| (p.size as f64, p.value)).collect();
    let curve: Vec<(f64, f64)> = fit
        .grid
        .size
        .iter()
        .zip(fit.grid.value.iter())
        .map(|(&s, &v)| (s, v))
        .collect();

    let title = format!("{} vs N | a={:.4}", fit.statistic.display_name(), fit.fit.exponent);
    render_plot(
        &title,
        &[
            Layer { points: &curve, ch: '-', line: true },
            Layer { points: &points, ch: 'o', line: false },
        ],
        (Scale::Log, Scale::Log),
        width,
        height,
    )
}

/// Render the averaged `statistic` against `c` for every dataset.
pub fn render_curves_plot(
    datasets: &[Dataset],
    statistic: Statistic,
    y_scale: Scale,
    width: usize,
    height: usize,
) -> String {
    let col = statistic.column();
    let series: Vec<Vec<(f64, f64)>> = datasets
        .iter()
        .map(|ds| {
            if ds.averaged.ncols() <= col {
                return Vec::new();
            }
            ds.averaged
                .row_iter()
                .map(|row| (row[0], row[col]))
                .collect()
        })
        .collect();

    let layers: Vec<Layer<'_>> = series
        .iter()
        .enumerate()
        .map(|(i, pts)| Layer {
            points: pts,
            ch: std::char::from_digit(((i + 1) % 10) as u32, 10).unwrap_or('*'),
            line: false,
        })
        .collect();

    let legend: Vec<String> = datasets
        .iter()
        .enumerate()
        .map(|(i, ds)| format!("{}=N{}", (i + 1) % 10, ds.size))
        .collect();
    let title = format!("{} vs c | {}", statistic.display_name(), legend.join(" "));

    render_plot(&title, &layers, (Scale::Linear, y_scale), width, height)
}

fn render_plot(
    title: &str,
    layers: &[Layer<'_>],
    scales: (Scale, Scale),
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let transformed: Vec<Vec<(f64, f64)>> = layers
        .iter()
        .map(|l| {
            l.points
                .iter()
                .filter_map(|&(x, y)| Some((scales.0.apply(x)?, scales.1.apply(y)?)))
                .collect()
        })
        .collect();

    let all: Vec<(f64, f64)> = transformed.iter().flatten().copied().collect();
    let (x_min, x_max) = x_bounds(&all).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_bounds(&all).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers overlay them.
    for (layer, pts) in layers.iter().zip(&transformed).filter(|(l, _)| l.line) {
        draw_curve(&mut grid, pts, layer.ch, (x_min, x_max), (y_min, y_max));
    }
    for (layer, pts) in layers.iter().zip(&transformed).filter(|(l, _)| !l.line) {
        for &(x, y) in pts {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = layer.ch;
        }
    }

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&format!(
        "x: {}[{x_min:.3}, {x_max:.3}] | y: {}[{y_min:.3}, {y_max:.3}]\n",
        scales.0.label(),
        scales.1.label()
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn x_bounds(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    bounds(points.iter().map(|p| p.0))
}

fn y_bounds(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    bounds(points.iter().map(|p| p.1))
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v.is_finite() && max_v.is_finite() && max_v > min_v {
        Some((min_v, max_v))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], ch: char, xr: (f64, f64), yr: (f64, f64)) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, xr.0, xr.1, width);
        let row = map_y(y, yr.0, yr.1, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
