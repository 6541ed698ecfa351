//! Output files: ranking and summary tables as CSV, the margin chart as SVG.

pub mod chart;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::margin::MarginReport;
use crate::models::{
    AttributeSales, CategoryRanking, CategorySales, InstallmentSegment, MicroMarket, MonthlyOrders,
    SellerDelivery, SellerNiche, SellerStateOrders, SellerStatePricing, StateFreight, StateShare, TopSeller,
};
use chart::{render_bar_chart, Bar};

pub const RANKING_FILE: &str = "category_margin_ranking.csv";

const BASE_COLUMNS: [&str; 13] = [
    "category",
    "qty_sold",
    "avg_price",
    "median_price",
    "avg_freight",
    "avg_weight_g",
    "volume_cm3",
    "cost_factor",
    "estimated_cost_unit",
    "realized_margin_unit",
    "current_revenue_total",
    "current_margin_total",
    "price_elasticity",
];

const SCENARIO_COLUMNS: [&str; 6] = [
    "sim_price",
    "sim_qty",
    "sim_margin_unit",
    "sim_revenue_total",
    "sim_margin_total",
    "delta_margin_total",
];

/// Paths written by [`export_margin`].
#[derive(Debug, Clone, PartialEq)]
pub struct MarginOutputs {
    pub table: PathBuf,
    /// `None` when the chart was skipped.
    pub chart: Option<PathBuf>,
}

/// A summary row type with a fixed column layout.
///
/// `HEADER` must list the serialized field names in declaration order.
pub trait Table: Serialize {
    const HEADER: &'static [&'static str];
}

macro_rules! table {
    ($ty:ty, [$($col:literal),+ $(,)?]) => {
        impl Table for $ty {
            const HEADER: &'static [&'static str] = &[$($col),+];
        }
    };
}

table!(InstallmentSegment, ["install_segment", "customers", "avg_ltv", "median_ltv", "avg_orders"]);
table!(
    MicroMarket,
    [
        "zip_code_prefix",
        "order_count",
        "avg_ticket",
        "median_ticket",
        "avg_delivery_days",
        "unique_customers",
        "lat_med",
        "lng_med",
    ]
);
table!(
    StateFreight,
    [
        "customer_state",
        "order_volume",
        "order_share_pct",
        "mean_freight_share",
        "median_freight_share",
        "mean_freight",
    ]
);
table!(CategorySales, ["category", "order_count", "avg_price"]);
table!(MonthlyOrders, ["customer_state", "year_month", "num_orders"]);
table!(AttributeSales, ["value", "order_count"]);
table!(StateShare, ["state", "count", "share_pct"]);
table!(SellerStatePricing, ["seller_state", "avg_price", "avg_freight"]);
table!(TopSeller, ["seller_id", "items_sold", "seller_city", "seller_state"]);
table!(SellerStateOrders, ["seller_state", "orders"]);
table!(SellerNiche, ["category", "sellers"]);
table!(
    SellerDelivery,
    [
        "seller_state",
        "items",
        "median_delivery_days",
        "q1_delivery_days",
        "q3_delivery_days",
    ]
);

/// Write rows as CSV under their header, creating parent dirs.
///
/// The header is written even when `rows` is empty.
pub fn write_csv<T: Table>(rows: &[T], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

/// Header of the ranking table for the report's scenarios.
pub fn ranking_header(report: &MarginReport) -> Vec<String> {
    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for row_label in scenario_labels(report) {
        for col in SCENARIO_COLUMNS {
            header.push(format!("{}_{}", col, row_label));
        }
    }
    header
}

/// Write the ranking table to any writer, one row per category in rank order.
///
/// Undefined elasticity is an empty cell. Floats use the shortest
/// representation that round-trips, so identical reports give identical bytes.
pub fn write_ranking<W: io::Write>(report: &MarginReport, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(ranking_header(report))?;
    for row in &report.rows {
        writer.write_record(ranking_record(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the ranking table to `path`, creating parent dirs.
pub fn write_ranking_csv(report: &MarginReport, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let file = fs::File::create(path)?;
    write_ranking(report, io::BufWriter::new(file))?;
    info!(path = %path.display(), rows = report.len(), "wrote margin ranking");
    Ok(())
}

/// File name of the chart for the top `n` categories, if a chart applies.
pub fn chart_file_name(report: &MarginReport, n: usize) -> Option<String> {
    report
        .primary_label()
        .map(|label| format!("category_margin_top{}_{}.svg", n, label))
}

/// Render the top `n` categories by the first scenario's margin delta.
///
/// Returns `Ok(false)` without writing when no scenario is configured or
/// there is nothing to plot.
pub fn write_top_chart(report: &MarginReport, n: usize, path: &Path) -> Result<bool> {
    let Some(top) = report.top(n) else {
        warn!("no price increase scenario configured; skipping margin chart");
        return Ok(false);
    };
    if top.is_empty() {
        warn!("no categories to plot; skipping margin chart");
        return Ok(false);
    }

    let pct = report.scenarios.first().copied().unwrap_or_default() * 100.0;
    let bars: Vec<Bar> = top
        .iter()
        .map(|row| {
            Bar::new(
                row.category(),
                row.primary().map(|s| s.delta_margin_total).unwrap_or(0.0),
            )
        })
        .collect();
    let svg = render_bar_chart(
        &format!(
            "Top {} categories by estimated margin gain (+{}% price)",
            top.len(),
            pct_text(pct)
        ),
        &format!("Estimated total margin gain (R$), +{}% price", pct_text(pct)),
        "Category",
        &bars,
    );

    ensure_parent(path)?;
    fs::write(path, svg)?;
    info!(path = %path.display(), bars = bars.len(), "wrote margin chart");
    Ok(true)
}

/// Write the ranking table and, when a scenario exists, the top-`n` chart
/// into `dir`.
pub fn export_margin(report: &MarginReport, dir: &Path, n: usize) -> Result<MarginOutputs> {
    let table = dir.join(RANKING_FILE);
    write_ranking_csv(report, &table)?;

    let chart = match chart_file_name(report, n) {
        Some(name) => {
            let path = dir.join(name);
            write_top_chart(report, n, &path)?.then_some(path)
        }
        None => {
            warn!("no price increase scenario configured; skipping margin chart");
            None
        }
    };

    Ok(MarginOutputs { table, chart })
}

fn scenario_labels(report: &MarginReport) -> Vec<String> {
    report
        .scenarios
        .iter()
        .map(|inc| crate::config::scenario_label(*inc))
        .collect()
}

fn ranking_record(row: &CategoryRanking) -> Vec<String> {
    let e = &row.economics;
    let mut record = vec![
        e.category.clone(),
        e.qty_sold.to_string(),
        e.avg_price.to_string(),
        e.median_price.to_string(),
        e.avg_freight.to_string(),
        e.avg_weight_g.to_string(),
        e.volume_cm3.to_string(),
        e.cost_factor.to_string(),
        e.estimated_cost_unit.to_string(),
        e.realized_margin_unit.to_string(),
        e.current_revenue_total.to_string(),
        e.current_margin_total.to_string(),
        e.price_elasticity.map(|v| v.to_string()).unwrap_or_default(),
    ];
    for s in &row.scenarios {
        record.extend([
            s.sim_price.to_string(),
            s.sim_qty.to_string(),
            s.sim_margin_unit.to_string(),
            s.sim_revenue_total.to_string(),
            s.sim_margin_total.to_string(),
            s.delta_margin_total.to_string(),
        ]);
    }
    record
}

fn pct_text(pct: f64) -> String {
    if (pct - pct.round()).abs() < 1e-6 {
        format!("{}", pct.round() as i64)
    } else {
        format!("{:.1}", pct)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
