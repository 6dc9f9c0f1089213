use crate::chart::{chart_file_name, render_product_chart, CHART_SUFFIX};
use crate::error::Result;
use crate::types::{Dashboard, MetricCardRow, ProductMetricsRow, ProductReport};
use crate::util::{format_delta, format_int, format_money, format_number};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn metric_card(report: &ProductReport) -> Vec<MetricCardRow> {
    let s = &report.summary;
    let v = &report.variation;
    vec![
        MetricCardRow {
            metric: "Average Price".to_string(),
            value: format_money(s.avg_price),
            delta: format_delta(v.price_pct),
        },
        MetricCardRow {
            metric: "Average Margin".to_string(),
            value: format!("{}%", format_number(s.avg_margin_pct, 2)),
            delta: format_delta(v.margin_pct),
        },
        MetricCardRow {
            metric: "Units Sold".to_string(),
            value: format_int(s.units_sold.round() as i64),
            delta: format_delta(v.units_pct),
        },
    ]
}

pub fn metrics_rows(dashboard: &Dashboard) -> Vec<ProductMetricsRow> {
    dashboard
        .products
        .iter()
        .map(|p| ProductMetricsRow {
            product: p.summary.product.clone(),
            avg_price: format_number(p.summary.avg_price, 2),
            price_variation: format_delta(p.variation.price_pct),
            avg_margin: format_number(p.summary.avg_margin_pct, 2),
            margin_variation: format_delta(p.variation.margin_pct),
            units_sold: format_number(p.summary.units_sold, 0),
            units_variation: format_delta(p.variation.units_pct),
        })
        .collect()
}

/// Print the header, one metric card per product and an overview table.
///
/// Each product's trend chart is written into `chart_dir` and its path is
/// printed under the card.
pub fn print_dashboard(dashboard: &Dashboard, chart_dir: &Path) {
    let g = &dashboard.global;
    println!("Sales Data - Branch: {}\n", dashboard.branch);
    println!(
        "{} rows | {} products | {} branches",
        format_int(g.rows as i64),
        format_int(g.products as i64),
        format_int(g.branches as i64)
    );
    println!(
        "Overall average price: {} | Overall margin: {}% | Average units per product: {}\n",
        format_money(g.avg_price),
        format_number(g.avg_margin_pct, 2),
        format_number(g.avg_units_per_product, 2)
    );

    if dashboard.products.is_empty() {
        clear_stale_charts(chart_dir);
        println!("(no rows for this selection)\n");
        return;
    }

    let charts = render_charts(dashboard, chart_dir);
    for (idx, report) in dashboard.products.iter().enumerate() {
        println!("### {}\n", report.summary.product);
        let table_str = Table::new(metric_card(report))
            .with(Style::markdown())
            .to_string();
        println!("{}", table_str);

        match charts.get(idx).and_then(Option::as_ref) {
            Some(path) => println!("Trend chart: {}", path.display()),
            None => println!("Trend chart: (not available)"),
        }
        println!();
    }

    println!("Overview (branch: {})\n", dashboard.branch);
    preview_table_rows(&metrics_rows(dashboard), dashboard.products.len());
}

/// Remove chart files left by an earlier render.
fn clear_stale_charts(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_chart = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(CHART_SUFFIX));
        if is_chart {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "could not remove old chart");
            }
        }
    }
}

/// Write one trend chart per product into `dir`, replacing earlier charts.
///
/// The result lines up with `dashboard.products`; `None` marks a product
/// with no points or a chart that failed to render.
pub fn render_charts(dashboard: &Dashboard, dir: &Path) -> Vec<Option<PathBuf>> {
    clear_stale_charts(dir);
    dashboard
        .products
        .iter()
        .enumerate()
        .map(|(idx, report)| {
            let path = dir.join(chart_file_name(idx, &report.summary.product));
            match render_product_chart(&path, report) {
                Ok(true) => Some(path),
                Ok(false) => None,
                Err(e) => {
                    warn!(product = %report.summary.product, error = %e, "chart failed");
                    None
                }
            }
        })
        .collect()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Write the per-product table and the JSON summary into `dir`.
pub fn export_dashboard(dashboard: &Dashboard, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let csv_path = dir.join("product_metrics.csv");
    write_csv(&csv_path, &metrics_rows(dashboard))?;
    let json_path = dir.join("summary.json");
    write_json(&json_path, dashboard)?;
    Ok((csv_path, json_path))
}
