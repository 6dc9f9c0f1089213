use crate::error::{DashboardError, Result};
use crate::types::ProductReport;
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

fn chart_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Chart(e.to_string())
}

/// Suffix shared by every chart file, used to spot charts from earlier renders.
pub const CHART_SUFFIX: &str = "_trend.svg";

/// Filesystem-safe SVG file name for the product at `index` in a render.
///
/// The index keeps names unique even when two products slug to the same
/// text (`Te/a` and `Te a`) or differ only by case on a case-insensitive
/// filesystem.
pub fn chart_file_name(index: usize, product: &str) -> String {
    let slug: String = product
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        format!("{:02}_product{}", index + 1, CHART_SUFFIX)
    } else {
        format!("{:02}_{}{}", index + 1, slug, CHART_SUFFIX)
    }
}

fn month_label(start: NaiveDate, elapsed_days: f64) -> String {
    (start + Duration::days(elapsed_days.round() as i64))
        .format("%Y-%m")
        .to_string()
}

/// Draw units sold over time plus the fitted trend line.
///
/// Returns `Ok(false)` without touching the filesystem when there is
/// nothing to plot.
pub fn render_product_chart(path: &Path, report: &ProductReport) -> Result<bool> {
    let series = &report.series;
    let Some(first) = series.first() else {
        return Ok(false);
    };
    let start = first.date;

    let trend_points: Vec<(f64, f64)> = report
        .trend
        .map(|fit| {
            series
                .iter()
                .map(|p| (p.elapsed_days, fit.at(p.elapsed_days)))
                .collect()
        })
        .unwrap_or_default();

    let x_max = series
        .iter()
        .map(|p| p.elapsed_days)
        .fold(0.0, f64::max)
        .max(1.0);
    let values = series
        .iter()
        .map(|p| p.units_sold)
        .chain(trend_points.iter().map(|p| p.1));
    let (y_min, y_max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let y_max = y_max.max(1.0) * 1.1;

    let root = SVGBackend::new(path, (960, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Sales Trend - {}", report.summary.product),
            ("sans-serif", 22),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Units Sold")
        .x_label_formatter(&|d: &f64| month_label(start, *d))
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|p| (p.elapsed_days, p.units_sold)),
            &BLUE,
        ))
        .map_err(chart_err)?
        .label("Units Sold")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    if !trend_points.is_empty() {
        chart
            .draw_series(LineSeries::new(trend_points, &RED))
            .map_err(chart_err)?
            .label("Trend")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(path = %path.display(), product = %report.summary.product, "chart written");
    Ok(true)
}
