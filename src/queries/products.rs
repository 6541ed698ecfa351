//! Product rows from the `products` table.

use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::Result;
use crate::models::Product;
use crate::sql_builder::{numeric_or_null, text_or_null, SqlBuilder};

const REQUIRED_COLUMNS: [&str; 2] = ["product_id", "product_category_name"];

/// Physical attributes; any of them may be absent from the file.
pub const DIMENSION_COLUMNS: [&str; 4] = [
    "product_weight_g",
    "product_length_cm",
    "product_height_cm",
    "product_width_cm",
];

/// Query interface for the product catalog backed by the `products` view.
pub struct ProductQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ProductQuery<'a> {
    /// Create a new `ProductQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load every product, in file order.
    ///
    /// Blank categories read as `None`. Unparsable dimensions read as
    /// `None`, and a dimension column missing from the file is treated as
    /// entirely null.
    pub fn all(&self) -> Result<Vec<Product>> {
        let (sql, params) = self.base_query()?.build();
        let products: Vec<Product> = self.conn.execute_into(&sql, &params)?;
        debug!(rows = products.len(), "loaded products");
        Ok(products)
    }

    fn base_query(&self) -> Result<SqlBuilder> {
        self.conn.ensure_tables(&["products"])?;
        let present = self.conn.require_columns("products", &REQUIRED_COLUMNS)?;

        let mut cols = vec![
            "product_id".to_string(),
            format!(
                "{} AS product_category_name",
                text_or_null("product_category_name")
            ),
        ];
        for col in DIMENSION_COLUMNS {
            if present.contains(col) {
                cols.push(format!("{} AS {}", numeric_or_null(col), col));
            } else {
                warn!(column = col, "products table has no such column; treating as null");
                cols.push(format!("CAST(NULL AS DOUBLE) AS {}", col));
            }
        }

        let mut qb = SqlBuilder::new("products");
        qb.select(&cols).where_clause("product_id IS NOT NULL", &[]);
        Ok(qb)
    }
}
