//! Order item rows from the `order_items` table.

use tracing::debug;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::OrderItem;
use crate::sql_builder::{numeric_or_zero, SqlBuilder};

const REQUIRED_COLUMNS: [&str; 4] = ["order_id", "product_id", "price", "freight_value"];

/// Query interface for order items backed by the `order_items` view.
pub struct ItemQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ItemQuery<'a> {
    /// Create a new `ItemQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load every item, in file order.
    ///
    /// Price and freight that are missing or unparsable read as 0. Rows
    /// without an order or product id are skipped. Fails with
    /// `MissingField` when one of the four columns is absent.
    pub fn all(&self) -> Result<Vec<OrderItem>> {
        let (sql, params) = self.base_query()?.build();
        let items: Vec<OrderItem> = self.conn.execute_into(&sql, &params)?;
        debug!(rows = items.len(), "loaded order items");
        Ok(items)
    }

    fn base_query(&self) -> Result<SqlBuilder> {
        self.conn.ensure_tables(&["order_items"])?;
        self.conn.require_columns("order_items", &REQUIRED_COLUMNS)?;

        let price = format!("{} AS price", numeric_or_zero("price"));
        let freight = format!("{} AS freight_value", numeric_or_zero("freight_value"));
        let mut qb = SqlBuilder::new("order_items");
        qb.select(&["order_id", "product_id", price.as_str(), freight.as_str()])
            .where_clause("order_id IS NOT NULL AND product_id IS NOT NULL", &[]);
        Ok(qb)
    }
}
