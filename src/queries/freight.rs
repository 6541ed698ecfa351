//! Relative weight of freight in the purchase price, per customer state.

use crate::connection::Connection;
use crate::error::Result;
use crate::models::StateFreight;
use crate::sql_builder::numeric_or_null;
use crate::stats;

/// Query interface over `orders`, `order_items` and `customers`.
pub struct FreightQuery<'a> {
    conn: &'a Connection,
}

impl<'a> FreightQuery<'a> {
    /// Create a new `FreightQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Freight share statistics per state, by order volume descending.
    ///
    /// Only delivered orders count, and only items with a positive price,
    /// a non-negative freight and a known customer state. The freight share
    /// of an item is `freight / (price + freight)`.
    pub fn by_state(&self) -> Result<Vec<StateFreight>> {
        self.conn
            .ensure_tables(&["orders", "order_items", "customers"])?;
        self.conn
            .require_columns("orders", &["order_id", "customer_id", "order_status"])?;
        self.conn
            .require_columns("order_items", &["order_id", "price", "freight_value"])?;
        self.conn
            .require_columns("customers", &["customer_id", "customer_state"])?;

        let sql = format!(
            r#"
            WITH delivered AS (
                SELECT o.order_id,
                       c.customer_state,
                       {price} AS price,
                       {freight} AS freight
                FROM orders o
                JOIN order_items i ON o.order_id = i.order_id
                LEFT JOIN customers c ON o.customer_id = c.customer_id
                WHERE o.order_status = 'delivered'
            ),
            priced AS (
                SELECT *, freight / (price + freight) AS freight_share
                FROM delivered
                WHERE price IS NOT NULL
                  AND freight IS NOT NULL
                  AND customer_state IS NOT NULL
                  AND price > 0
                  AND freight >= 0
            )
            SELECT customer_state,
                   COUNT(DISTINCT order_id) AS order_volume,
                   100.0 * CAST(COUNT(DISTINCT order_id) AS DOUBLE)
                       / CAST(SUM(COUNT(DISTINCT order_id)) OVER () AS DOUBLE) AS order_share_pct,
                   CAST(AVG(freight_share) AS DOUBLE) AS mean_freight_share,
                   CAST(MEDIAN(freight_share) AS DOUBLE) AS median_freight_share,
                   CAST(AVG(freight) AS DOUBLE) AS mean_freight
            FROM priced
            GROUP BY customer_state
            ORDER BY order_volume DESC, customer_state
            "#,
            price = numeric_or_null("i.price"),
            freight = numeric_or_null("i.freight_value"),
        );

        self.conn.execute_into(&sql, &[])
    }

    /// States whose mean freight share exceeds the mean across all states,
    /// highest share first.
    pub fn above_average(&self) -> Result<Vec<StateFreight>> {
        Ok(above_average(self.by_state()?))
    }
}

/// Filter `states` to those above the cross-state mean freight share.
pub fn above_average(states: Vec<StateFreight>) -> Vec<StateFreight> {
    let Some(overall) = stats::mean(states.iter().map(|s| s.mean_freight_share)) else {
        return Vec::new();
    };
    let mut above: Vec<StateFreight> = states
        .into_iter()
        .filter(|s| s.mean_freight_share > overall)
        .collect();
    above.sort_by(|a, b| b.mean_freight_share.total_cmp(&a.mean_freight_share));
    above
}
