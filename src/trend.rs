use crate::types::{DerivedRow, LinearFit, SeriesPoint};
use crate::util::days_diff;
use chrono::NaiveDate;

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// One point per sales row, oldest first.
///
/// Rows sharing a month keep their input order, so several branches in the
/// same month become several points at the same `elapsed_days`.
pub fn product_series(rows: &[&DerivedRow]) -> Vec<SeriesPoint> {
    let mut dated: Vec<(NaiveDate, &DerivedRow)> = rows
        .iter()
        .filter_map(|r| {
            NaiveDate::from_ymd_opt(r.record.year, r.record.month, 1).map(|d| (d, *r))
        })
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let Some(first) = dated.first().map(|(date, _)| *date) else {
        return Vec::new();
    };
    dated
        .into_iter()
        .map(|(date, r)| SeriesPoint {
            date,
            branch: r.record.branch.clone(),
            elapsed_days: days_diff(first, date),
            units_sold: r.record.units_sold,
        })
        .collect()
}

/// Ordinary least squares fit of `y = slope * x + intercept`.
///
/// With a single distinct `x` the slope is undefined; a flat line through
/// the mean of `y` is returned instead.
pub fn fit_linear(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    if sxx.abs() < f64::EPSILON {
        return Some(LinearFit {
            slope: 0.0,
            intercept: mean_y,
        });
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

pub fn fit_series(series: &[SeriesPoint]) -> Option<LinearFit> {
    let xs: Vec<f64> = series.iter().map(|p| p.elapsed_days).collect();
    let ys: Vec<f64> = series.iter().map(|p| p.units_sold).collect();
    fit_linear(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive_rows;
    use crate::types::SalesRecord;

    fn rec(branch: &str, year: i32, month: u32, units: f64) -> SalesRecord {
        SalesRecord {
            branch: branch.into(),
            product: "Cafe".into(),
            year,
            month,
            units_sold: units,
            revenue: units * 2.0,
            cost: units,
        }
    }

    #[test]
    fn test_fit_recovers_known_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x + 1.0).collect();
        let fit = fit_linear(&xs, &ys).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.at(10.0) - 31.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert_eq!(fit_linear(&[], &[]), None);
        let flat = fit_linear(&[5.0, 5.0], &[2.0, 4.0]).unwrap();
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.intercept, 3.0);
    }

    #[test]
    fn test_series_keeps_every_row_in_date_order() {
        let rows = derive_rows(&[
            rec("Sur", 2023, 3, 5.0),
            rec("Norte", 2023, 1, 10.0),
            rec("Sur", 2023, 1, 4.0),
        ]);
        let refs: Vec<&DerivedRow> = rows.iter().collect();
        let series = product_series(&refs);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(series[0].branch, "Norte");
        assert_eq!(series[1].branch, "Sur");
        assert_eq!(
            series.iter().map(|p| p.elapsed_days).collect::<Vec<_>>(),
            vec![0.0, 0.0, 59.0]
        );
        assert_eq!(
            series.iter().map(|p| p.units_sold).collect::<Vec<_>>(),
            vec![10.0, 4.0, 5.0]
        );
    }

    #[test]
    fn test_trend_fits_every_branch_row() {
        let rows = derive_rows(&[
            rec("Norte", 2023, 1, 10.0),
            rec("Sur", 2023, 1, 4.0),
            rec("Sur", 2023, 3, 5.0),
        ]);
        let refs: Vec<&DerivedRow> = rows.iter().collect();
        let fit = fit_series(&product_series(&refs)).unwrap();
        let direct = fit_linear(&[0.0, 0.0, 59.0], &[10.0, 4.0, 5.0]).unwrap();
        assert!((fit.slope - direct.slope).abs() < 1e-12);
        assert!((fit.slope + 2.0 / 59.0).abs() < 1e-9);
        assert!((fit.intercept - 7.0).abs() < 1e-9);
    }
}
