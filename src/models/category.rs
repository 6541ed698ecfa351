use serde::{Deserialize, Serialize};

use crate::config::FALLBACK_ELASTICITY;

// ---------------------------------------------------------------------------
// CategoryAggregate — Per-category statistics over joined order items
// ---------------------------------------------------------------------------

/// Central tendencies of one category. Physical attributes are medians and
/// stay `None` when no item of the category carries the attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub qty_sold: u64,
    pub avg_price: f64,
    pub median_price: f64,
    pub avg_freight: f64,
    pub avg_weight_g: Option<f64>,
    pub avg_length_cm: Option<f64>,
    pub avg_height_cm: Option<f64>,
    pub avg_width_cm: Option<f64>,
}

// ---------------------------------------------------------------------------
// ProductAggregate — Per-product sales within a category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub category: String,
    pub product_id: String,
    pub qty_sold_prod: u64,
    pub avg_price_prod: f64,
}

// ---------------------------------------------------------------------------
// CategoryEconomics — Cost model and current margin of a category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEconomics {
    pub category: String,
    pub qty_sold: u64,
    pub avg_price: f64,
    pub median_price: f64,
    pub avg_freight: f64,
    /// Median weight after imputation.
    pub avg_weight_g: f64,
    /// Product of the imputed median length, height and width.
    pub volume_cm3: f64,
    /// Bulk multiplier in [0.9, 1.5].
    pub cost_factor: f64,
    pub estimated_cost_unit: f64,
    pub realized_margin_unit: f64,
    pub current_revenue_total: f64,
    pub current_margin_total: f64,
    /// Log-log slope of quantity on price; `None` without enough samples.
    pub price_elasticity: Option<f64>,
}

impl CategoryEconomics {
    /// Elasticity used for simulation, falling back to -1.5.
    pub fn elasticity_filled(&self) -> f64 {
        self.price_elasticity.unwrap_or(FALLBACK_ELASTICITY)
    }
}

// ---------------------------------------------------------------------------
// ScenarioResult — One simulated price increase for a category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Column suffix, e.g. `inc_5pct`.
    pub label: String,
    pub increase: f64,
    pub elasticity_used: f64,
    pub sim_price: f64,
    pub sim_qty: f64,
    pub sim_margin_unit: f64,
    pub sim_revenue_total: f64,
    pub sim_margin_total: f64,
    pub delta_margin_total: f64,
}

// ---------------------------------------------------------------------------
// CategoryRanking — Economics plus every configured scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRanking {
    pub economics: CategoryEconomics,
    /// One entry per configured scenario, in configuration order.
    pub scenarios: Vec<ScenarioResult>,
}

impl CategoryRanking {
    pub fn category(&self) -> &str {
        &self.economics.category
    }

    pub fn scenario(&self, label: &str) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.label == label)
    }

    /// Result of the first configured scenario.
    pub fn primary(&self) -> Option<&ScenarioResult> {
        self.scenarios.first()
    }
}
