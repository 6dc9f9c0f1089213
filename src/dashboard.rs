// Assembles the full dashboard for one branch selection.
//
// Runs from scratch every time it is called; nothing is cached between
// calls, so the same records and filter always give the same result.
use crate::loader::filter_by_branch;
use crate::metrics::{derive_rows, global_summary, product_summary, products_in_order};
use crate::trend::{fit_series, product_series};
use crate::types::{BranchFilter, Dashboard, DerivedRow, ProductReport, SalesRecord};
use crate::variation::compute_variations;
use tracing::debug;

pub fn build_dashboard(records: &[SalesRecord], filter: &BranchFilter) -> Dashboard {
    let filtered = filter_by_branch(records, filter);
    let rows = derive_rows(&filtered);
    let global = global_summary(&rows);
    let variations = compute_variations(&rows);

    let products = products_in_order(&rows)
        .into_iter()
        .map(|product| {
            let product_rows: Vec<&DerivedRow> =
                rows.iter().filter(|r| r.record.product == product).collect();
            let summary = product_summary(&product, &product_rows);
            let variation = variations.get(&product).copied().unwrap_or_default();
            let series = product_series(&product_rows);
            let trend = fit_series(&series);
            debug!(product = %product, points = series.len(), "built product report");
            ProductReport {
                summary,
                variation,
                series,
                trend,
            }
        })
        .collect();

    Dashboard {
        branch: filter.to_string(),
        global,
        products,
    }
}
