use crate::types::{DerivedRow, GlobalSummary, ProductSummary, SalesRecord};
use crate::util::safe_div;
use std::collections::HashSet;

pub fn derive_row(record: &SalesRecord) -> DerivedRow {
    DerivedRow {
        unit_price: safe_div(record.revenue, record.units_sold),
        margin_pct: safe_div(record.revenue - record.cost, record.revenue) * 100.0,
        record: record.clone(),
    }
}

pub fn derive_rows(records: &[SalesRecord]) -> Vec<DerivedRow> {
    records.iter().map(derive_row).collect()
}

/// Distinct products in order of first appearance.
pub fn products_in_order(rows: &[DerivedRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.record.product.as_str()))
        .map(|r| r.record.product.clone())
        .collect()
}

#[derive(Default)]
struct Totals {
    units: f64,
    revenue: f64,
    cost: f64,
}

fn totals<'a, I>(rows: I) -> Totals
where
    I: IntoIterator<Item = &'a DerivedRow>,
{
    rows.into_iter().fold(Totals::default(), |mut acc, r| {
        acc.units += r.record.units_sold;
        acc.revenue += r.record.revenue;
        acc.cost += r.record.cost;
        acc
    })
}

/// Price and margin are ratios of sums, not means of per-row ratios.
pub fn product_summary(product: &str, rows: &[&DerivedRow]) -> ProductSummary {
    let t = totals(rows.iter().copied());
    ProductSummary {
        product: product.to_string(),
        avg_price: safe_div(t.revenue, t.units),
        avg_margin_pct: safe_div(t.revenue - t.cost, t.revenue) * 100.0,
        units_sold: t.units,
    }
}

pub fn global_summary(rows: &[DerivedRow]) -> GlobalSummary {
    let t = totals(rows);
    let products = products_in_order(rows).len();
    let branches: HashSet<&str> = rows.iter().map(|r| r.record.branch.as_str()).collect();
    GlobalSummary {
        rows: rows.len(),
        products,
        branches: branches.len(),
        avg_price: safe_div(t.revenue, t.units),
        avg_margin_pct: safe_div(t.revenue - t.cost, t.revenue) * 100.0,
        avg_units_per_product: safe_div(t.units, products as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(branch: &str, product: &str, units: f64, revenue: f64, cost: f64) -> SalesRecord {
        SalesRecord {
            branch: branch.into(),
            product: product.into(),
            year: 2023,
            month: 1,
            units_sold: units,
            revenue,
            cost,
        }
    }

    #[test]
    fn test_derive_row() {
        let d = derive_row(&rec("Norte", "Cafe", 10.0, 200.0, 150.0));
        assert_eq!(d.unit_price, 20.0);
        assert_eq!(d.margin_pct, 25.0);
    }

    #[test]
    fn test_zero_units_and_revenue_are_guarded() {
        let d = derive_row(&rec("Norte", "Cafe", 0.0, 0.0, 10.0));
        assert_eq!(d.unit_price, 0.0);
        assert_eq!(d.margin_pct, 0.0);

        let rows = derive_rows(&[rec("Norte", "Cafe", 0.0, 0.0, 0.0)]);
        let refs: Vec<&DerivedRow> = rows.iter().collect();
        let s = product_summary("Cafe", &refs);
        assert!(s.avg_price.is_finite() && s.avg_margin_pct.is_finite());
        assert_eq!(s.avg_price, 0.0);
    }

    #[test]
    fn test_product_summary_uses_ratio_of_sums() {
        let rows = derive_rows(&[
            rec("Norte", "Cafe", 10.0, 100.0, 50.0),
            rec("Sur", "Cafe", 30.0, 100.0, 90.0),
        ]);
        let refs: Vec<&DerivedRow> = rows.iter().collect();
        let s = product_summary("Cafe", &refs);
        assert_eq!(s.avg_price, 5.0);
        assert!((s.avg_margin_pct - 30.0).abs() < 1e-9);
        assert_eq!(s.units_sold, 40.0);
    }

    #[test]
    fn test_global_summary_and_product_order() {
        let rows = derive_rows(&[
            rec("Norte", "Te", 10.0, 100.0, 50.0),
            rec("Sur", "Cafe", 30.0, 300.0, 150.0),
            rec("Sur", "Te", 20.0, 200.0, 100.0),
        ]);
        assert_eq!(products_in_order(&rows), vec!["Te", "Cafe"]);
        let g = global_summary(&rows);
        assert_eq!(g.rows, 3);
        assert_eq!(g.products, 2);
        assert_eq!(g.branches, 2);
        assert_eq!(g.avg_price, 10.0);
        assert_eq!(g.avg_margin_pct, 50.0);
        assert_eq!(g.avg_units_per_product, 30.0);
    }

    #[test]
    fn test_global_summary_empty() {
        let g = global_summary(&[]);
        assert_eq!(g.products, 0);
        assert_eq!(g.avg_units_per_product, 0.0);
    }
}
