//! Candidate micro-markets by customer zip code prefix.

use tracing::debug;

use crate::config::MIN_MICRO_MARKET_ORDERS;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::MicroMarket;
use crate::sql_builder::{numeric_or_null, numeric_or_zero, whole_days_between};
use crate::stats;

/// Query interface over `orders`, `order_items`, `customers` and `geolocation`.
pub struct MicroMarketQuery<'a> {
    conn: &'a Connection,
}

impl<'a> MicroMarketQuery<'a> {
    /// Create a new `MicroMarketQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Order count, ticket and delivery statistics for every zip prefix,
    /// with the median coordinates of the prefix. Ordered by prefix.
    ///
    /// The ticket of an order is the sum of its item prices; delivery days
    /// are whole days between purchase and delivery, rounded down.
    pub fn zip_summary(&self) -> Result<Vec<MicroMarket>> {
        self.conn
            .ensure_tables(&["orders", "order_items", "customers", "geolocation"])?;
        self.conn.require_columns(
            "orders",
            &[
                "order_id",
                "customer_id",
                "order_purchase_timestamp",
                "order_delivered_customer_date",
            ],
        )?;
        self.conn.require_columns("order_items", &["order_id", "price"])?;
        self.conn
            .require_columns("customers", &["customer_id", "customer_zip_code_prefix"])?;
        self.conn.require_columns(
            "geolocation",
            &[
                "geolocation_zip_code_prefix",
                "geolocation_lat",
                "geolocation_lng",
            ],
        )?;

        let sql = format!(
            r#"
            WITH tickets AS (
                SELECT order_id, SUM({price}) AS order_value
                FROM order_items
                GROUP BY order_id
            ),
            orders_ticket AS (
                SELECT o.order_id,
                       o.customer_id,
                       t.order_value,
                       TRY_CAST(c.customer_zip_code_prefix AS BIGINT) AS zip_code_prefix,
                       {days} AS delivery_days
                FROM orders o
                LEFT JOIN tickets t ON o.order_id = t.order_id
                LEFT JOIN customers c ON o.customer_id = c.customer_id
            ),
            zips AS (
                SELECT zip_code_prefix,
                       COUNT(order_id) AS order_count,
                       AVG(order_value) AS avg_ticket,
                       MEDIAN(order_value) AS median_ticket,
                       AVG(delivery_days) AS avg_delivery_days,
                       COUNT(DISTINCT customer_id) AS unique_customers
                FROM orders_ticket
                WHERE zip_code_prefix IS NOT NULL
                GROUP BY zip_code_prefix
            ),
            geo AS (
                SELECT TRY_CAST(geolocation_zip_code_prefix AS BIGINT) AS zip_code_prefix,
                       MEDIAN({lat}) AS lat_med,
                       MEDIAN({lng}) AS lng_med
                FROM geolocation
                GROUP BY 1
            )
            SELECT z.zip_code_prefix,
                   z.order_count,
                   CAST(z.avg_ticket AS DOUBLE) AS avg_ticket,
                   CAST(z.median_ticket AS DOUBLE) AS median_ticket,
                   CAST(z.avg_delivery_days AS DOUBLE) AS avg_delivery_days,
                   z.unique_customers,
                   CAST(g.lat_med AS DOUBLE) AS lat_med,
                   CAST(g.lng_med AS DOUBLE) AS lng_med
            FROM zips z
            LEFT JOIN geo g ON z.zip_code_prefix = g.zip_code_prefix
            ORDER BY z.zip_code_prefix
            "#,
            price = numeric_or_zero("price"),
            lat = numeric_or_null("geolocation_lat"),
            lng = numeric_or_null("geolocation_lng"),
            days = whole_days_between(
                "o.order_purchase_timestamp",
                "o.order_delivered_customer_date"
            ),
        );

        let rows: Vec<MicroMarket> = self.conn.execute_into(&sql, &[])?;
        debug!(prefixes = rows.len(), "summarised zip prefixes");
        Ok(rows)
    }

    /// Zip prefixes busy enough to be candidate micro-markets, busiest first.
    ///
    /// See [`candidate_threshold`] for the cut-off.
    pub fn candidates(&self) -> Result<Vec<MicroMarket>> {
        Ok(select_candidates(self.zip_summary()?))
    }
}

/// Minimum order count for a candidate: the larger of 50 and the 75th
/// percentile of order counts (rounded down).
pub fn candidate_threshold(markets: &[MicroMarket]) -> i64 {
    let q75 = stats::quantile(markets.iter().map(|m| m.order_count as f64), 0.75)
        .map(|q| q.floor() as i64)
        .unwrap_or(0);
    q75.max(MIN_MICRO_MARKET_ORDERS)
}

/// Keep prefixes at or above [`candidate_threshold`], sorted by order count
/// descending, then by prefix.
pub fn select_candidates(markets: Vec<MicroMarket>) -> Vec<MicroMarket> {
    let threshold = candidate_threshold(&markets);
    let mut candidates: Vec<MicroMarket> = markets
        .into_iter()
        .filter(|m| m.order_count >= threshold)
        .collect();
    candidates.sort_by(|a, b| {
        b.order_count
            .cmp(&a.order_count)
            .then(a.zip_code_prefix.cmp(&b.zip_code_prefix))
    });
    debug!(threshold, candidates = candidates.len(), "selected micro-markets");
    candidates
}
