//! Four-panel diagnostic figure rendered to SVG with Plotters.
//!
//! Panels (row-major):
//! 1. averaged mean-cluster size vs `c`, one series per N (log y)
//! 2. averaged max-cluster size vs `c`, one series per N
//! 3. mean-cluster series at the target `c` vs N with its fit (log-log)
//! 4. max-cluster series at the target `c` vs N with its fit (log-log)
//!
//! Log axes are drawn as linear axes over `log10` values with `1e{v}` tick
//! labels; this keeps every panel on the same `f64` Cartesian coordinate type.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::domain::{Dataset, PowerLawFit, Series, Statistic};
use crate::error::{AppError, ErrorKind};
use crate::models::log_grid;
use crate::plot::Scale;

const SIZE: (u32, u32) = (1000, 1000);

/// Matplotlib "tab10"-style palette; readable on white.
const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

struct PanelLayer {
    label: String,
    points: Vec<(f64, f64)>,
    color: RGBColor,
    line: bool,
}

struct Panel<'a> {
    title: String,
    x_desc: &'a str,
    y_desc: String,
    scales: (Scale, Scale),
    layers: Vec<PanelLayer>,
}

/// Render the diagnostic figure as an SVG document.
pub fn render_diagnostics_svg(
    datasets: &[Dataset],
    fits: &[(Series, PowerLawFit)],
) -> Result<String, AppError> {
    let panels = [
        curves_panel(datasets, Statistic::MeanCluster, Scale::Log),
        curves_panel(datasets, Statistic::MaxCluster, Scale::Linear),
        fit_panel(fits, Statistic::MeanCluster),
        fit_panel(fits, Statistic::MaxCluster),
    ];

    let mut svg = String::new();
    draw_figure(&mut svg, &panels)
        .map_err(|e| AppError::new(ErrorKind::Format, format!("Failed to render SVG: {e}")))?;

    debug!(bytes = svg.len(), "rendered diagnostic figure");
    Ok(svg)
}

fn curves_panel(datasets: &[Dataset], statistic: Statistic, y_scale: Scale) -> Panel<'static> {
    let col = statistic.column();
    let layers = datasets
        .iter()
        .enumerate()
        .filter(|(_, ds)| ds.averaged.ncols() > col)
        .map(|(i, ds)| PanelLayer {
            label: format!("N {}", ds.size),
            points: ds.averaged.row_iter().map(|row| (row[0], row[col])).collect(),
            color: PALETTE[i % PALETTE.len()],
            line: false,
        })
        .collect();

    Panel {
        title: format!("{} vs c", statistic.display_name()),
        x_desc: "c",
        y_desc: statistic.display_name().to_string(),
        scales: (Scale::Linear, y_scale),
        layers,
    }
}

fn fit_panel(fits: &[(Series, PowerLawFit)], statistic: Statistic) -> Panel<'static> {
    let mut layers = Vec::new();
    let mut title = format!("{} at c vs N", statistic.display_name());

    if let Some((series, fit)) = fits.iter().find(|(s, _)| s.statistic == statistic) {
        title = format!(
            "{} at c={} vs N, a={:.4}",
            statistic.display_name(),
            series.target,
            fit.exponent
        );
        let points: Vec<(f64, f64)> = series.sizes().into_iter().zip(series.values()).collect();
        let lo = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);

        layers.push(PanelLayer {
            label: "averaged".to_string(),
            points,
            color: PALETTE[0],
            line: false,
        });
        layers.push(PanelLayer {
            label: format!("N^{:.4}", fit.exponent),
            points: log_grid(fit.exponent, lo, hi, 200),
            color: PALETTE[3],
            line: true,
        });
    }

    Panel {
        title,
        x_desc: "N",
        y_desc: statistic.display_name().to_string(),
        scales: (Scale::Log, Scale::Log),
        layers,
    }
}

fn draw_figure(buf: &mut String, panels: &[Panel<'_>]) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::with_string(buf, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 2));
    for (area, panel) in areas.iter().zip(panels) {
        draw_panel(area, panel)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(area: &DrawingArea<SVGBackend<'_>, Shift>, panel: &Panel<'_>) -> Result<(), Box<dyn Error>> {
    let (xs, ys) = panel.scales;
    let layers: Vec<(&PanelLayer, Vec<(f64, f64)>)> = panel
        .layers
        .iter()
        .map(|l| {
            let pts = l
                .points
                .iter()
                .filter_map(|&(x, y)| Some((xs.apply(x)?, ys.apply(y)?)))
                .collect();
            (l, pts)
        })
        .collect();

    let all = layers.iter().flat_map(|(_, pts)| pts.iter().copied());
    let (x0, x1) = padded_range(all.clone().map(|p| p.0));
    let (y0, y1) = padded_range(all.map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    let y_desc = format!("{}{}", ys.label(), panel.y_desc);
    let x_desc = format!("{}{}", xs.label(), panel.x_desc);
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|v| fmt_tick(*v, xs))
        .y_label_formatter(&|v| fmt_tick(*v, ys))
        .draw()?;

    for (layer, pts) in &layers {
        let color = layer.color;
        if layer.line {
            chart
                .draw_series(LineSeries::new(pts.iter().copied(), color.stroke_width(2)))?
                .label(layer.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2)));
        } else {
            chart
                .draw_series(pts.iter().map(|&p| Circle::new(p, 3, color.filled())))?
                .label(layer.label.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
        }
    }

    if !layers.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(())
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-9);
    (lo - pad, hi + pad)
}

fn fmt_tick(v: f64, scale: Scale) -> String {
    match scale {
        Scale::Linear => format!("{v:.2}"),
        Scale::Log => format!("1e{v:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, SeriesPoint, Table};
    use std::path::PathBuf;

    #[test]
    fn writes_svg_with_all_panel_titles() {
        let datasets: Vec<Dataset> = [1000u64, 10_000]
            .iter()
            .map(|&size| Dataset {
                size,
                path: PathBuf::from(format!("n{size}.txt")),
                trials: 2,
                averaged: Table::from_row_slice(
                    3,
                    3,
                    &[0.5, 2.0, 0.01, 1.0, (size as f64).sqrt(), 0.05, 1.5, 3.0, 0.5],
                ),
            })
            .collect();
        let series = Series {
            statistic: Statistic::MeanCluster,
            target: 1.0,
            points: datasets
                .iter()
                .map(|d| SeriesPoint { size: d.size, value: d.averaged[(1, 1)] })
                .collect(),
        };
        let fit = PowerLawFit {
            exponent: 0.5,
            variance: Some(0.0),
            quality: FitQuality { sse: 0.0, rmse: 0.0, iterations: 1, n: 2 },
        };

        let svg = render_diagnostics_svg(&datasets, &[(series, fit)]).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("vs c"));
        assert!(svg.contains("a=0.5000"));
        assert!(svg.contains("N 10000"));
    }

    #[test]
    fn tick_labels_follow_scale() {
        assert_eq!(fmt_tick(3.0, Scale::Log), "1e3.0");
        assert_eq!(fmt_tick(0.5, Scale::Linear), "0.50");
    }
}
