//! Monthly sales of one category, split by customer state.

use tracing::debug;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::MonthlyOrders;
use crate::sql_builder::{text_or_null, SqlBuilder};

/// Query interface over `order_items`, `products`, `orders` and `customers`.
pub struct TrendQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TrendQuery<'a> {
    /// Create a new `TrendQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Items sold in `category` per customer state and purchase month,
    /// ordered by state then month.
    ///
    /// Category names are compared after [`normalize_category`] on both
    /// sides. Items without a category, customer state or parsable purchase
    /// date are ignored. An unknown category gives an empty result.
    pub fn monthly_by_state(&self, category: &str) -> Result<Vec<MonthlyOrders>> {
        self.conn
            .ensure_tables(&["order_items", "products", "orders", "customers"])?;
        self.conn
            .require_columns("order_items", &["order_id", "product_id"])?;
        self.conn
            .require_columns("products", &["product_id", "product_category_name"])?;
        self.conn.require_columns(
            "orders",
            &["order_id", "customer_id", "order_purchase_timestamp"],
        )?;
        self.conn
            .require_columns("customers", &["customer_id", "customer_state"])?;

        let state = text_or_null("c.customer_state");
        let month = "strftime(TRY_CAST(o.order_purchase_timestamp AS TIMESTAMP), '%Y-%m')";
        let cols = [
            format!("{} AS customer_state", state),
            format!("{} AS year_month", month),
            "COUNT(*) AS num_orders".to_string(),
        ];
        let (sql, params) = SqlBuilder::new("order_items i")
            .select(&cols)
            .join("LEFT JOIN products p ON i.product_id = p.product_id")
            .join("LEFT JOIN orders o ON i.order_id = o.order_id")
            .join("LEFT JOIN customers c ON o.customer_id = c.customer_id")
            .where_clause(
                &format!("{} = ?", normalized_category_sql("p.product_category_name")),
                &[normalize_category(category).as_str()],
            )
            .where_clause(&format!("{} IS NOT NULL", state), &[])
            .where_clause(&format!("{} IS NOT NULL", month), &[])
            .group_by(&[state.as_str(), month])
            .order_by(&["customer_state", "year_month"])
            .build();

        let rows: Vec<MonthlyOrders> = self.conn.execute_into(&sql, &params)?;
        debug!(category, rows = rows.len(), "built monthly category trend");
        Ok(rows)
    }
}

/// Lower-case, drop everything but ASCII letters, digits, `_` and spaces,
/// then turn spaces into underscores: `"Cama Mesa"` -> `"cama_mesa"`.
pub fn normalize_category(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// SQL counterpart of [`normalize_category`].
fn normalized_category_sql(column: &str) -> String {
    format!(
        "replace(regexp_replace(lower({}), '[^A-Za-z0-9_ ]', '', 'g'), ' ', '_')",
        column
    )
}
