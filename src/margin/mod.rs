//! Latent margin simulation per product category.
//!
//! Joins order items to products, aggregates per category, derives a cost
//! proxy from physical bulk, estimates price elasticity from product-level
//! variation and projects uniform price increases. Categories are ranked by
//! the margin gained in the first configured scenario.

pub mod aggregate;
pub mod cost;
pub mod elasticity;
pub mod scenario;

pub use scenario::RankingKey;

use tracing::{debug, info};

use crate::config::MarginConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{CategoryRanking, OrderItem, Product};
use crate::queries::{ItemQuery, ProductQuery};

// ---------------------------------------------------------------------------
// MarginReport
// ---------------------------------------------------------------------------

/// Ranked categories with their simulated scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginReport {
    /// Categories sorted by `ranking_key`, largest first.
    pub rows: Vec<CategoryRanking>,
    /// Simulated price increases, in configuration order.
    pub scenarios: Vec<f64>,
    pub ranking_key: RankingKey,
}

impl MarginReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The first `n` ranked categories, for charting.
    ///
    /// `None` when no scenario was configured, since the chart plots the
    /// first scenario's margin delta.
    pub fn top(&self, n: usize) -> Option<&[CategoryRanking]> {
        match self.ranking_key {
            RankingKey::Scenario(_) => Some(&self.rows[..n.min(self.rows.len())]),
            RankingKey::CurrentMargin => None,
        }
    }

    /// Label of the scenario that drives the ranking, if any.
    pub fn primary_label(&self) -> Option<&str> {
        match &self.ranking_key {
            RankingKey::Scenario(label) => Some(label),
            RankingKey::CurrentMargin => None,
        }
    }
}

/// Run the whole margin pipeline over in-memory rows.
///
/// Fails only on an invalid configuration; empty input gives an empty report.
pub fn simulate(
    items: &[OrderItem],
    products: &[Product],
    config: &MarginConfig,
) -> Result<MarginReport> {
    config.validate()?;

    let joined = aggregate::join_items(items, products);
    let aggregates = aggregate::category_aggregates(&joined);
    let product_rows = aggregate::product_aggregates(&joined);
    debug!(
        items = items.len(),
        categories = aggregates.len(),
        products = product_rows.len(),
        "aggregated order items"
    );

    let elasticities = elasticity::estimate_all(&product_rows);
    let economics = cost::economics(aggregates, &elasticities, config.cost_ratio_default);

    let mut rows: Vec<CategoryRanking> = economics
        .into_iter()
        .map(|econ| scenario::simulate_all(econ, &config.price_increase_scenarios))
        .collect();

    let ranking_key = RankingKey::for_config(config);
    scenario::rank(&mut rows, &ranking_key);
    info!(
        categories = rows.len(),
        sort_column = %ranking_key.column(),
        "ranked categories by margin"
    );

    Ok(MarginReport {
        rows,
        scenarios: config.price_increase_scenarios.clone(),
        ranking_key,
    })
}

// ---------------------------------------------------------------------------
// MarginSimulator
// ---------------------------------------------------------------------------

/// Runs the margin simulation against the `order_items` and `products` tables.
pub struct MarginSimulator<'a> {
    conn: &'a Connection,
}

impl<'a> MarginSimulator<'a> {
    /// Create a new `MarginSimulator` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load both tables and run [`simulate`].
    pub fn run(&self, config: &MarginConfig) -> Result<MarginReport> {
        config.validate()?;
        let items = ItemQuery::new(self.conn).all()?;
        let products = ProductQuery::new(self.conn).all()?;
        simulate(&items, &products, config)
    }
}
