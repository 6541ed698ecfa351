use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderItem — One line of an order (olist_order_items_dataset)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
    /// Item price; coerced to 0 when missing or unparsable.
    pub price: f64,
    /// Freight charged for the item; coerced to 0 when missing or unparsable.
    pub freight_value: f64,
}

impl OrderItem {
    pub fn new(order_id: &str, product_id: &str, price: f64, freight_value: f64) -> Self {
        Self {
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            price,
            freight_value,
        }
    }
}
