use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// InstallmentSegment — Customer lifetime value by installment behaviour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentSegment {
    pub install_segment: String,
    pub customers: i64,
    pub avg_ltv: f64,
    pub median_ltv: f64,
    pub avg_orders: f64,
}

// ---------------------------------------------------------------------------
// MicroMarket — Orders, ticket and delivery time for a customer zip prefix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroMarket {
    pub zip_code_prefix: i64,
    pub order_count: i64,
    pub avg_ticket: Option<f64>,
    pub median_ticket: Option<f64>,
    pub avg_delivery_days: Option<f64>,
    pub unique_customers: i64,
    pub lat_med: Option<f64>,
    pub lng_med: Option<f64>,
}

// ---------------------------------------------------------------------------
// StateFreight — Weight of freight in the purchase price per customer state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFreight {
    pub customer_state: String,
    pub order_volume: i64,
    /// Share of all delivered orders, in percent.
    pub order_share_pct: f64,
    /// Mean of `freight / (price + freight)` over the state's items.
    pub mean_freight_share: f64,
    pub median_freight_share: f64,
    pub mean_freight: f64,
}

// ---------------------------------------------------------------------------
// CategorySales — Order count and mean item price of a product category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: String,
    pub order_count: i64,
    pub avg_price: f64,
}

// ---------------------------------------------------------------------------
// AttributeSales — Order count for one value of a product attribute
// ---------------------------------------------------------------------------

/// Items sold for one value of a product attribute (photo count,
/// description length or volume).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSales {
    pub value: f64,
    pub order_count: i64,
}

// ---------------------------------------------------------------------------
// MonthlyOrders — Items sold in a category per customer state and month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyOrders {
    pub customer_state: String,
    /// Purchase month as `YYYY-MM`.
    pub year_month: String,
    pub num_orders: i64,
}
