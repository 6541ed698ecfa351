use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{InsightsError, Result};

/// Directory charts and ranking tables are written to when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "plots/insights";

/// Number of categories shown in the margin chart.
pub const DEFAULT_TOP_N: usize = 15;

/// Minimum number of priced, sold products a category needs before its
/// elasticity is estimated.
pub const MIN_ELASTICITY_SAMPLES: usize = 5;

/// Elasticity assumed for categories without an estimate.
pub const FALLBACK_ELASTICITY: f64 = -1.5;

pub const NORMALIZATION_EPSILON: f64 = 1e-9;

pub const COST_FACTOR_MIN: f64 = 0.9;
pub const COST_FACTOR_SPAN: f64 = 0.6;

/// Categories listed in the best-seller table.
pub const DEFAULT_TOP_CATEGORIES: usize = 8;

/// Category whose monthly trend is reported when none is given.
pub const DEFAULT_TREND_CATEGORY: &str = "casa_construcao";

/// Sellers listed in the top-seller table.
pub const DEFAULT_TOP_SELLERS: usize = 10;

/// Floor on the order count of a candidate micro-market.
pub const MIN_MICRO_MARKET_ORDERS: i64 = 50;

pub const DEFAULT_COST_RATIO: f64 = 0.6;
pub const DEFAULT_PRICE_INCREASES: [f64; 2] = [0.05, 0.10];

pub fn csv_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("orders", "olist_orders_dataset.csv"),
        ("order_items", "olist_order_items_dataset.csv"),
        ("order_payments", "olist_order_payments_dataset.csv"),
        ("order_reviews", "olist_order_reviews_dataset.csv"),
        ("customers", "olist_customers_dataset.csv"),
        ("sellers", "olist_sellers_dataset.csv"),
        ("products", "olist_products_dataset.csv"),
        ("geolocation", "olist_geolocation_dataset.csv"),
        (
            "category_translation",
            "product_category_name_translation.csv",
        ),
    ])
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("olist-insights")
    } else {
        PathBuf::from(".olist-insights-cache")
    }
}

// ---------------------------------------------------------------------------
// MarginConfig
// ---------------------------------------------------------------------------

/// Parameters of the category margin simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginConfig {
    /// Share of the average price assumed to be unit cost before the
    /// physical cost factor is applied. Must lie in (0, 1].
    pub cost_ratio_default: f64,
    /// Price increases to simulate, as fractions (0.05 = +5%). The first
    /// entry drives the ranking and the chart.
    pub price_increase_scenarios: Vec<f64>,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            cost_ratio_default: DEFAULT_COST_RATIO,
            price_increase_scenarios: DEFAULT_PRICE_INCREASES.to_vec(),
        }
    }
}

impl MarginConfig {
    pub fn new(cost_ratio_default: f64, price_increase_scenarios: Vec<f64>) -> Self {
        Self {
            cost_ratio_default,
            price_increase_scenarios,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ratio = self.cost_ratio_default;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(InsightsError::InvalidArgument(format!(
                "cost_ratio_default must be in (0, 1], got {}",
                ratio
            )));
        }
        let mut labels: HashMap<String, f64> = HashMap::new();
        for inc in &self.price_increase_scenarios {
            if !inc.is_finite() || *inc <= 0.0 {
                return Err(InsightsError::InvalidArgument(format!(
                    "price increase scenarios must be finite and > 0, got {}",
                    inc
                )));
            }
            // Labels name the output columns and key scenario lookups
            let label = scenario_label(*inc);
            if let Some(prev) = labels.insert(label.clone(), *inc) {
                return Err(InsightsError::InvalidArgument(format!(
                    "price increase scenarios {} and {} share the label {}",
                    prev, inc, label
                )));
            }
        }
        Ok(())
    }

    /// Label of the scenario that drives ranking, if any is configured.
    pub fn primary_scenario(&self) -> Option<String> {
        self.price_increase_scenarios
            .first()
            .map(|inc| scenario_label(*inc))
    }
}

/// Column suffix for a price increase: `0.05` -> `inc_5pct`, `0.025` -> `inc_2.5pct`.
pub fn scenario_label(inc: f64) -> String {
    let pct = inc * 100.0;
    let whole = pct.round();
    if (pct - whole).abs() < 1e-6 {
        format!("inc_{}pct", whole as i64)
    } else {
        format!("inc_{:.1}pct", pct)
    }
}
