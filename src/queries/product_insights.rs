//! Order counts by product attribute: category, photo count, description
//! length and volume.
//!
//! Items are left-joined to the catalog. An item whose attribute is missing
//! or unparsable does not count towards any group.

use serde::Deserialize;
use tracing::debug;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{AttributeSales, CategorySales};
use crate::sql_builder::{numeric_or_null, numeric_or_zero, text_or_null, SqlBuilder};

const ITEMS: &str = "order_items i";
const CATALOG_JOIN: &str = "LEFT JOIN products p ON i.product_id = p.product_id";

#[derive(Deserialize)]
struct DimensionCount {
    length_cm: f64,
    height_cm: f64,
    width_cm: f64,
    order_count: i64,
}

/// Query interface over `order_items` joined to `products`.
pub struct ProductInsightQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ProductInsightQuery<'a> {
    /// Create a new `ProductInsightQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// The `n` categories with the most items sold, with their mean price.
    ///
    /// Ties are broken by category name. Prices that are missing or
    /// unparsable read as 0, as in the item loader.
    pub fn top_categories(&self, n: usize) -> Result<Vec<CategorySales>> {
        self.require(&["product_category_name"])?;
        self.conn.require_columns("order_items", &["price"])?;

        let category = text_or_null("p.product_category_name");
        let cols = [
            format!("{} AS category", category),
            "COUNT(i.order_id) AS order_count".to_string(),
            format!("CAST(AVG({}) AS DOUBLE) AS avg_price", numeric_or_zero("i.price")),
        ];
        let (sql, params) = SqlBuilder::new(ITEMS)
            .select(&cols)
            .join(CATALOG_JOIN)
            .where_clause(&format!("{} IS NOT NULL", category), &[])
            .group_by(&[category.as_str()])
            .order_by(&["order_count DESC", "category"])
            .limit(n)
            .build();

        let rows: Vec<CategorySales> = self.conn.execute_into(&sql, &params)?;
        debug!(categories = rows.len(), "ranked categories by items sold");
        Ok(rows)
    }

    /// Items sold per number of product photos, by photo count.
    pub fn orders_by_photos(&self) -> Result<Vec<AttributeSales>> {
        self.orders_by("product_photos_qty")
    }

    /// Items sold per product description length, by length.
    pub fn orders_by_description_length(&self) -> Result<Vec<AttributeSales>> {
        // Column name as spelled in the Olist export
        self.orders_by("product_description_lenght")
    }

    /// Items sold per product volume (cm³), by volume.
    ///
    /// Volume is length × height × width. Products missing a dimension, or
    /// whose volume is not finite, are left out.
    pub fn orders_by_volume(&self) -> Result<Vec<AttributeSales>> {
        const DIMS: [&str; 3] = ["product_length_cm", "product_height_cm", "product_width_cm"];
        self.require(&DIMS)?;

        let exprs: Vec<String> = DIMS
            .iter()
            .map(|col| numeric_or_null(&format!("p.{}", col)))
            .collect();
        let cols = [
            format!("{} AS length_cm", exprs[0]),
            format!("{} AS height_cm", exprs[1]),
            format!("{} AS width_cm", exprs[2]),
            "COUNT(i.order_id) AS order_count".to_string(),
        ];
        let present = format!(
            "{} IS NOT NULL AND {} IS NOT NULL AND {} IS NOT NULL",
            exprs[0], exprs[1], exprs[2]
        );
        let group: Vec<&str> = exprs.iter().map(|e| e.as_str()).collect();
        let (sql, params) = SqlBuilder::new(ITEMS)
            .select(&cols)
            .join(CATALOG_JOIN)
            .where_clause(&present, &[])
            .group_by(&group)
            .build();

        // Multiplied here: DuckDB rejects DOUBLE overflow instead of yielding inf
        let rows: Vec<DimensionCount> = self.conn.execute_into(&sql, &params)?;
        let mut by_volume: Vec<AttributeSales> = rows
            .into_iter()
            .filter_map(|r| {
                let value = r.length_cm * r.height_cm * r.width_cm;
                value.is_finite().then_some(AttributeSales {
                    value,
                    order_count: r.order_count,
                })
            })
            .collect();
        by_volume.sort_by(|a, b| a.value.total_cmp(&b.value));
        by_volume.dedup_by(|next, kept| {
            if next.value == kept.value {
                kept.order_count += next.order_count;
                true
            } else {
                false
            }
        });
        debug!(volumes = by_volume.len(), "counted items by volume");
        Ok(by_volume)
    }

    fn orders_by(&self, column: &str) -> Result<Vec<AttributeSales>> {
        self.require(&[column])?;

        let value = numeric_or_null(&format!("p.{}", column));
        let cols = [
            format!("{} AS \"value\"", value),
            "COUNT(i.order_id) AS order_count".to_string(),
        ];
        let (sql, params) = SqlBuilder::new(ITEMS)
            .select(&cols)
            .join(CATALOG_JOIN)
            .where_clause(&format!("{} IS NOT NULL", value), &[])
            .group_by(&[value.as_str()])
            .order_by(&["\"value\""])
            .build();

        let rows: Vec<AttributeSales> = self.conn.execute_into(&sql, &params)?;
        debug!(column, groups = rows.len(), "counted items by product attribute");
        Ok(rows)
    }

    /// Register both tables and check the join keys plus `product_columns`.
    fn require(&self, product_columns: &[&str]) -> Result<()> {
        self.conn.ensure_tables(&["order_items", "products"])?;
        self.conn
            .require_columns("order_items", &["order_id", "product_id"])?;
        let mut required = vec!["product_id"];
        required.extend_from_slice(product_columns);
        self.conn.require_columns("products", &required)?;
        Ok(())
    }
}
