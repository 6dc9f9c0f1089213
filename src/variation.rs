use crate::types::{DerivedRow, Variation, YearAggregate};
use crate::util::average;
use std::collections::BTreeMap;

/// Per-year aggregates for one product's rows, sorted by year.
///
/// Price and margin are means of the per-row values; units are summed.
pub fn yearly_aggregates(rows: &[&DerivedRow]) -> Vec<YearAggregate> {
    #[derive(Default)]
    struct Acc {
        prices: Vec<f64>,
        margins: Vec<f64>,
        units: f64,
    }

    let mut by_year: BTreeMap<i32, Acc> = BTreeMap::new();
    for r in rows {
        let e = by_year.entry(r.record.year).or_default();
        e.prices.push(r.unit_price);
        e.margins.push(r.margin_pct);
        e.units += r.record.units_sold;
    }

    by_year
        .into_iter()
        .map(|(year, acc)| YearAggregate {
            year,
            avg_price: average(&acc.prices),
            avg_margin_pct: average(&acc.margins),
            units_sold: acc.units,
        })
        .collect()
}

/// Mean of consecutive percentage changes.
///
/// A change against a zero base is undefined and left out of the mean.
/// Returns `None` when no defined change exists (e.g. a single value).
pub fn mean_pct_change(values: &[f64]) -> Option<f64> {
    let changes: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .filter(|c| c.is_finite())
        .collect();
    if changes.is_empty() {
        None
    } else {
        Some(average(&changes))
    }
}

pub fn variation_for(rows: &[&DerivedRow]) -> Variation {
    let years = yearly_aggregates(rows);
    let prices: Vec<f64> = years.iter().map(|y| y.avg_price).collect();
    let margins: Vec<f64> = years.iter().map(|y| y.avg_margin_pct).collect();
    let units: Vec<f64> = years.iter().map(|y| y.units_sold).collect();
    Variation {
        price_pct: mean_pct_change(&prices),
        margin_pct: mean_pct_change(&margins),
        units_pct: mean_pct_change(&units),
    }
}

pub fn compute_variations(rows: &[DerivedRow]) -> BTreeMap<String, Variation> {
    let mut by_product: BTreeMap<&str, Vec<&DerivedRow>> = BTreeMap::new();
    for r in rows {
        by_product.entry(r.record.product.as_str()).or_default().push(r);
    }
    by_product
        .into_iter()
        .map(|(product, rows)| (product.to_string(), variation_for(&rows)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive_rows;
    use crate::types::SalesRecord;

    fn rec(product: &str, year: i32, month: u32, units: f64, revenue: f64, cost: f64) -> SalesRecord {
        SalesRecord {
            branch: "Norte".into(),
            product: product.into(),
            year,
            month,
            units_sold: units,
            revenue,
            cost,
        }
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.map(|v| (v - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_units_double_revenue_flat_halves_price() {
        let rows = derive_rows(&[
            rec("Cafe", 2022, 1, 10.0, 100.0, 60.0),
            rec("Cafe", 2023, 1, 20.0, 100.0, 60.0),
        ]);
        let v = compute_variations(&rows)["Cafe"];
        assert!(close(v.price_pct, -50.0));
        assert!(close(v.units_pct, 100.0));
        assert!(close(v.margin_pct, 0.0));
    }

    #[test]
    fn test_single_year_has_no_variation() {
        let rows = derive_rows(&[
            rec("Te", 2023, 1, 10.0, 100.0, 60.0),
            rec("Te", 2023, 2, 12.0, 110.0, 60.0),
        ]);
        let v = compute_variations(&rows)["Te"];
        assert_eq!(v, Variation::default());
    }

    #[test]
    fn test_mean_over_several_years() {
        // units: 100 -> 200 (+100%) -> 100 (-50%) => mean +25%
        let rows = derive_rows(&[
            rec("Cafe", 2021, 1, 100.0, 1000.0, 500.0),
            rec("Cafe", 2022, 1, 200.0, 2000.0, 1000.0),
            rec("Cafe", 2023, 1, 100.0, 1000.0, 500.0),
        ]);
        let v = compute_variations(&rows)["Cafe"];
        assert!(close(v.units_pct, 25.0));
        assert!(close(v.price_pct, 0.0));
    }

    #[test]
    fn test_zero_base_is_skipped() {
        assert_eq!(mean_pct_change(&[0.0, 10.0]), None);
        assert!(close(mean_pct_change(&[0.0, 10.0, 20.0]), 100.0));
        assert_eq!(mean_pct_change(&[5.0]), None);
        assert_eq!(mean_pct_change(&[]), None);
    }

    #[test]
    fn test_yearly_aggregates_sorted() {
        let rows = derive_rows(&[
            rec("Cafe", 2023, 1, 10.0, 100.0, 50.0),
            rec("Cafe", 2021, 1, 10.0, 200.0, 50.0),
            rec("Cafe", 2023, 2, 30.0, 100.0, 50.0),
        ]);
        let refs: Vec<&DerivedRow> = rows.iter().collect();
        let years = yearly_aggregates(&refs);
        assert_eq!(years.iter().map(|y| y.year).collect::<Vec<_>>(), vec![2021, 2023]);
        assert_eq!(years[1].units_sold, 40.0);
        assert!((years[1].avg_price - (10.0 + 100.0 / 30.0) / 2.0).abs() < 1e-9);
    }
}
