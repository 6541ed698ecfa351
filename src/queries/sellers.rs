//! Seller footprint: where sellers (and customers) are, what sellers
//! charge and ship, what they specialise in and how long deliveries take.
//!
//! Order volume, main categories and delivery times work on delivered
//! items: items joined to their order, seller and product, keeping those
//! with a recorded delivery at least one whole day after purchase.

use tracing::debug;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{
    SellerDelivery, SellerNiche, SellerStateOrders, SellerStatePricing, StateShare, TopSeller,
};
use crate::sql_builder::{numeric_or_zero, text_or_null, whole_days_between, SqlBuilder};

/// Query interface over `sellers`, `order_items`, `orders` and `products`.
pub struct SellerQuery<'a> {
    conn: &'a Connection,
}

impl<'a> SellerQuery<'a> {
    /// Create a new `SellerQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Registered sellers per state with their share, most first.
    pub fn by_state(&self) -> Result<Vec<StateShare>> {
        self.conn.ensure_tables(&["sellers"])?;
        self.conn
            .require_columns("sellers", &["seller_id", "seller_state"])?;
        self.state_shares("sellers", "seller_state")
    }

    /// Customers per state with their share, most first, for comparison
    /// with [`by_state`](Self::by_state).
    pub fn customer_states(&self) -> Result<Vec<StateShare>> {
        self.conn.ensure_tables(&["customers"])?;
        self.conn
            .require_columns("customers", &["customer_id", "customer_state"])?;
        self.state_shares("customers", "customer_state")
    }

    /// Mean item price and freight per seller state, by state.
    ///
    /// Every item of a known seller counts; missing or unparsable amounts
    /// read as 0, as in the item loader.
    pub fn pricing_by_state(&self) -> Result<Vec<SellerStatePricing>> {
        self.conn.ensure_tables(&["order_items", "sellers"])?;
        self.conn
            .require_columns("order_items", &["seller_id", "price", "freight_value"])?;
        self.conn
            .require_columns("sellers", &["seller_id", "seller_state"])?;

        let state = text_or_null("s.seller_state");
        let cols = [
            format!("{} AS seller_state", state),
            format!("CAST(AVG({}) AS DOUBLE) AS avg_price", numeric_or_zero("i.price")),
            format!(
                "CAST(AVG({}) AS DOUBLE) AS avg_freight",
                numeric_or_zero("i.freight_value")
            ),
        ];
        let (sql, params) = SqlBuilder::new("order_items i")
            .select(&cols)
            .join("JOIN sellers s ON i.seller_id = s.seller_id")
            .where_clause(&format!("{} IS NOT NULL", state), &[])
            .group_by(&[state.as_str()])
            .order_by(&["seller_state"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// The `n` sellers with the most items sold, with their city and state.
    ///
    /// Items of sellers missing from the seller table are not counted.
    /// Ties are broken by seller id.
    pub fn top_sellers(&self, n: usize) -> Result<Vec<TopSeller>> {
        self.conn.ensure_tables(&["order_items", "sellers"])?;
        self.conn.require_columns("order_items", &["seller_id"])?;
        self.conn.require_columns(
            "sellers",
            &["seller_id", "seller_city", "seller_state"],
        )?;

        let city = text_or_null("s.seller_city");
        let state = text_or_null("s.seller_state");
        let cols = [
            "s.seller_id".to_string(),
            "COUNT(*) AS items_sold".to_string(),
            format!("{} AS seller_city", city),
            format!("{} AS seller_state", state),
        ];
        let (sql, params) = SqlBuilder::new("order_items i")
            .select(&cols)
            .join("JOIN sellers s ON i.seller_id = s.seller_id")
            .group_by(&["s.seller_id", city.as_str(), state.as_str()])
            .order_by(&["items_sold DESC", "s.seller_id"])
            .limit(n)
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Distinct delivered orders per seller state, most first.
    pub fn order_volume_by_state(&self) -> Result<Vec<SellerStateOrders>> {
        let sql = format!(
            r#"
            {delivered}
            SELECT seller_state, COUNT(DISTINCT order_id) AS orders
            FROM delivered
            WHERE seller_state IS NOT NULL
            GROUP BY seller_state
            ORDER BY orders DESC, seller_state
            "#,
            delivered = self.delivered_items()?,
        );
        self.conn.execute_into(&sql, &[])
    }

    /// Number of sellers per main category, most first.
    ///
    /// A seller's main category is the one with the most delivered items;
    /// ties go to the alphabetically first category. Items without a
    /// category are ignored.
    pub fn main_categories(&self) -> Result<Vec<SellerNiche>> {
        let sql = format!(
            r#"
            {delivered},
            seller_category AS (
                SELECT seller_id, category, COUNT(*) AS items
                FROM delivered
                WHERE category IS NOT NULL
                GROUP BY seller_id, category
            ),
            main AS (
                SELECT seller_id, category
                FROM seller_category
                QUALIFY ROW_NUMBER() OVER (
                    PARTITION BY seller_id ORDER BY items DESC, category
                ) = 1
            )
            SELECT category, COUNT(*) AS sellers
            FROM main
            GROUP BY category
            ORDER BY sellers DESC, category
            "#,
            delivered = self.delivered_items()?,
        );

        let rows: Vec<SellerNiche> = self.conn.execute_into(&sql, &[])?;
        debug!(categories = rows.len(), "resolved seller main categories");
        Ok(rows)
    }

    /// Delivery time quartiles per seller state, fastest median first.
    pub fn delivery_by_state(&self) -> Result<Vec<SellerDelivery>> {
        let sql = format!(
            r#"
            {delivered}
            SELECT seller_state,
                   COUNT(*) AS items,
                   CAST(MEDIAN(delivery_days) AS DOUBLE) AS median_delivery_days,
                   CAST(QUANTILE_CONT(delivery_days, 0.25) AS DOUBLE) AS q1_delivery_days,
                   CAST(QUANTILE_CONT(delivery_days, 0.75) AS DOUBLE) AS q3_delivery_days
            FROM delivered
            WHERE seller_state IS NOT NULL
            GROUP BY seller_state
            ORDER BY median_delivery_days, seller_state
            "#,
            delivered = self.delivered_items()?,
        );
        self.conn.execute_into(&sql, &[])
    }

    /// Row count and percent share per non-blank value of `column`.
    fn state_shares(&self, table: &str, column: &str) -> Result<Vec<StateShare>> {
        let state = text_or_null(column);
        let cols = [
            format!("{} AS state", state),
            "COUNT(*) AS \"count\"".to_string(),
            "100.0 * CAST(COUNT(*) AS DOUBLE) / CAST(SUM(COUNT(*)) OVER () AS DOUBLE) AS share_pct"
                .to_string(),
        ];
        let (sql, params) = SqlBuilder::new(table)
            .select(&cols)
            .where_clause(&format!("{} IS NOT NULL", state), &[])
            .group_by(&[state.as_str()])
            .order_by(&["\"count\" DESC", "state"])
            .build();

        let rows: Vec<StateShare> = self.conn.execute_into(&sql, &params)?;
        debug!(table, states = rows.len(), "counted rows per state");
        Ok(rows)
    }

    /// `WITH delivered AS (...)` over the four tables.
    fn delivered_items(&self) -> Result<String> {
        self.conn
            .ensure_tables(&["order_items", "orders", "sellers", "products"])?;
        self.conn
            .require_columns("order_items", &["order_id", "product_id", "seller_id"])?;
        self.conn.require_columns(
            "orders",
            &[
                "order_id",
                "order_purchase_timestamp",
                "order_delivered_customer_date",
            ],
        )?;
        self.conn
            .require_columns("sellers", &["seller_id", "seller_state"])?;
        self.conn
            .require_columns("products", &["product_id", "product_category_name"])?;

        Ok(format!(
            r#"
            WITH merged AS (
                SELECT i.order_id,
                       i.seller_id,
                       {state} AS seller_state,
                       {category} AS category,
                       {days} AS delivery_days
                FROM order_items i
                JOIN orders o ON i.order_id = o.order_id
                JOIN sellers s ON i.seller_id = s.seller_id
                JOIN products p ON i.product_id = p.product_id
            ),
            delivered AS (
                SELECT * FROM merged WHERE delivery_days > 0
            )"#,
            state = text_or_null("s.seller_state"),
            category = text_or_null("p.product_category_name"),
            days = whole_days_between(
                "o.order_purchase_timestamp",
                "o.order_delivered_customer_date"
            ),
        ))
    }
}
