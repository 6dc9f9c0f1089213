use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Label used by the branch selector for "no filter".
pub const ALL_BRANCHES: &str = "All";

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Sucursal")]
    pub branch: Option<String>,
    #[serde(rename = "Producto")]
    pub product: Option<String>,
    #[serde(rename = "Año")]
    pub year: Option<String>,
    #[serde(rename = "Mes")]
    pub month: Option<String>,
    #[serde(rename = "Unidades_vendidas")]
    pub units_sold: Option<String>,
    #[serde(rename = "Ingreso_total")]
    pub revenue: Option<String>,
    #[serde(rename = "Costo_total")]
    pub cost: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub branch: String,
    pub product: String,
    pub year: i32,
    pub month: u32,
    pub units_sold: f64,
    pub revenue: f64,
    pub cost: f64,
}

/// A record plus its per-row derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub record: SalesRecord,
    pub unit_price: f64,
    pub margin_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BranchFilter {
    #[default]
    All,
    Only(String),
}

impl BranchFilter {
    /// Maps a selector choice to a filter; the "All" label disables filtering.
    pub fn from_choice(choice: &str) -> Self {
        let choice = choice.trim();
        if choice.is_empty() || choice == ALL_BRANCHES {
            BranchFilter::All
        } else {
            BranchFilter::Only(choice.to_string())
        }
    }

    pub fn matches(&self, branch: &str) -> bool {
        match self {
            BranchFilter::All => true,
            BranchFilter::Only(name) => name == branch,
        }
    }
}

impl fmt::Display for BranchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchFilter::All => f.write_str(ALL_BRANCHES),
            BranchFilter::Only(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product: String,
    pub avg_price: f64,
    pub avg_margin_pct: f64,
    pub units_sold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearAggregate {
    pub year: i32,
    pub avg_price: f64,
    pub avg_margin_pct: f64,
    pub units_sold: f64,
}

/// Mean year-over-year change in percent. `None` when no comparison exists.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Variation {
    pub price_pct: Option<f64>,
    pub margin_pct: Option<f64>,
    pub units_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub branch: String,
    pub elapsed_days: f64,
    pub units_sold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReport {
    pub summary: ProductSummary,
    pub variation: Variation,
    pub series: Vec<SeriesPoint>,
    pub trend: Option<LinearFit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
    pub rows: usize,
    pub products: usize,
    pub branches: usize,
    pub avg_price: f64,
    pub avg_margin_pct: f64,
    pub avg_units_per_product: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub branch: String,
    pub global: GlobalSummary,
    pub products: Vec<ProductReport>,
}

/// One metric line of a product card.
#[derive(Debug, Clone, Tabled)]
pub struct MetricCardRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Delta")]
    pub delta: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProductMetricsRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "AvgPrice")]
    #[tabled(rename = "AvgPrice")]
    pub avg_price: String,
    #[serde(rename = "PriceVariation")]
    #[tabled(rename = "PriceVariation")]
    pub price_variation: String,
    #[serde(rename = "AvgMargin")]
    #[tabled(rename = "AvgMargin")]
    pub avg_margin: String,
    #[serde(rename = "MarginVariation")]
    #[tabled(rename = "MarginVariation")]
    pub margin_variation: String,
    #[serde(rename = "UnitsSold")]
    #[tabled(rename = "UnitsSold")]
    pub units_sold: String,
    #[serde(rename = "UnitsVariation")]
    #[tabled(rename = "UnitsVariation")]
    pub units_variation: String,
}
