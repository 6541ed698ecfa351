//! Price increase projections and the ranking built on them.

use crate::config::{scenario_label, MarginConfig};
use crate::models::{CategoryEconomics, CategoryRanking, ScenarioResult};

/// Project one uniform price increase `inc` for a category.
///
/// Demand responds as `qty * (1 + inc)^elasticity`, never below zero.
pub fn simulate_scenario(econ: &CategoryEconomics, inc: f64) -> ScenarioResult {
    let elasticity = econ.elasticity_filled();
    let sim_price = econ.avg_price * (1.0 + inc);
    let sim_qty = (econ.qty_sold as f64 * (1.0 + inc).powf(elasticity)).max(0.0);
    let sim_margin_unit = sim_price - econ.avg_freight - econ.estimated_cost_unit;
    let sim_margin_total = sim_margin_unit * sim_qty;

    ScenarioResult {
        label: scenario_label(inc),
        increase: inc,
        elasticity_used: elasticity,
        sim_price,
        sim_qty,
        sim_margin_unit,
        sim_revenue_total: sim_price * sim_qty,
        sim_margin_total,
        delta_margin_total: sim_margin_total - econ.current_margin_total,
    }
}

/// Attach every configured scenario to a category, in configuration order.
pub fn simulate_all(econ: CategoryEconomics, increases: &[f64]) -> CategoryRanking {
    let scenarios = increases
        .iter()
        .map(|inc| simulate_scenario(&econ, *inc))
        .collect();
    CategoryRanking {
        economics: econ,
        scenarios,
    }
}

// ---------------------------------------------------------------------------
// RankingKey
// ---------------------------------------------------------------------------

/// Column the ranking is sorted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingKey {
    /// Delta margin total of the scenario with this label.
    Scenario(String),
    /// Current margin total; used when no scenario is configured.
    CurrentMargin,
}

impl RankingKey {
    pub fn for_config(config: &MarginConfig) -> Self {
        match config.primary_scenario() {
            Some(label) => RankingKey::Scenario(label),
            None => RankingKey::CurrentMargin,
        }
    }

    /// Name of the sort column in the ranking table.
    pub fn column(&self) -> String {
        match self {
            RankingKey::Scenario(label) => format!("delta_margin_total_{}", label),
            RankingKey::CurrentMargin => "current_margin_total".to_string(),
        }
    }

    pub fn value(&self, row: &CategoryRanking) -> f64 {
        match self {
            RankingKey::Scenario(label) => row
                .scenario(label)
                .map(|s| s.delta_margin_total)
                .unwrap_or(f64::NEG_INFINITY),
            RankingKey::CurrentMargin => row.economics.current_margin_total,
        }
    }
}

/// Sort rows by `key`, largest first. Ties keep their incoming order.
pub fn rank(rows: &mut [CategoryRanking], key: &RankingKey) {
    rows.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));
}
