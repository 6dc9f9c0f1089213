use crate::error::{DashboardError, Result};
use crate::types::{BranchFilter, RawRow, SalesRecord, ALL_BRANCHES};
use crate::util::{parse_f64_safe, parse_i32_safe};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Sucursal",
    "Producto",
    "Año",
    "Mes",
    "Unidades_vendidas",
    "Ingreso_total",
    "Costo_total",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    /// Rows whose year or month could not be coerced to a valid number.
    pub dropped_rows: usize,
    /// Rows with a non-numeric units/revenue/cost cell.
    pub bad_amounts: usize,
}

/// Rejects the table unless every required column is present.
pub fn validate_columns<'a, I>(headers: I, required: &[&str]) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = headers.into_iter().map(str::trim).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !present.contains(col))
        .map(|col| col.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::MissingColumns {
            missing,
            required: required.iter().map(|c| c.to_string()).collect(),
        })
    }
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<(Vec<SalesRecord>, LoadReport)> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading sales file");
    let file = File::open(path)?;
    load_from_reader(file)
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<SalesRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    // Strip a UTF-8 BOM so the first column name still matches.
    let headers = rdr.headers()?.clone();
    let cleaned: csv::StringRecord = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}'))
        .collect();
    validate_columns(cleaned.iter(), &REQUIRED_COLUMNS)?;
    rdr.set_headers(cleaned);

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "skipping malformed row");
                report.dropped_rows += 1;
                continue;
            }
        };

        let year = parse_i32_safe(row.year.as_deref());
        let month = parse_i32_safe(row.month.as_deref()).filter(|m| (1..=12).contains(m));
        let (Some(year), Some(month)) = (year, month) else {
            report.dropped_rows += 1;
            continue;
        };

        let units = parse_f64_safe(row.units_sold.as_deref());
        let revenue = parse_f64_safe(row.revenue.as_deref());
        let cost = parse_f64_safe(row.cost.as_deref());
        let (Some(units_sold), Some(revenue), Some(cost)) = (units, revenue, cost) else {
            report.bad_amounts += 1;
            continue;
        };

        records.push(SalesRecord {
            branch: row.branch.unwrap_or_default().trim().to_string(),
            product: row.product.unwrap_or_default().trim().to_string(),
            year,
            month: month as u32,
            units_sold,
            revenue,
            cost,
        });
    }

    report.kept_rows = records.len();
    info!(
        total = report.total_rows,
        kept = report.kept_rows,
        dropped = report.dropped_rows,
        bad_amounts = report.bad_amounts,
        "sales file loaded"
    );
    Ok((records, report))
}

pub fn filter_by_branch(records: &[SalesRecord], filter: &BranchFilter) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|r| filter.matches(&r.branch))
        .cloned()
        .collect()
}

/// Choices for the branch selector: "All" first, then branches sorted.
pub fn branch_options(records: &[SalesRecord]) -> Vec<String> {
    let branches: BTreeSet<&str> = records.iter().map(|r| r.branch.as_str()).collect();
    std::iter::once(ALL_BRANCHES.to_string())
        .chain(branches.into_iter().map(str::to_string))
        .collect()
}
