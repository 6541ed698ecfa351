use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StateShare — Sellers or customers registered in a state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateShare {
    pub state: String,
    pub count: i64,
    /// Share of all rows with a known state, in percent.
    pub share_pct: f64,
}

// ---------------------------------------------------------------------------
// SellerStateOrders — Distinct delivered orders shipped from a state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerStateOrders {
    pub seller_state: String,
    pub orders: i64,
}

// ---------------------------------------------------------------------------
// SellerNiche — Sellers whose best-selling category is this one
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerNiche {
    pub category: String,
    pub sellers: i64,
}

// ---------------------------------------------------------------------------
// SellerDelivery — Delivery time distribution by seller state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerDelivery {
    pub seller_state: String,
    /// Delivered items shipped from the state.
    pub items: i64,
    pub median_delivery_days: f64,
    pub q1_delivery_days: f64,
    pub q3_delivery_days: f64,
}

// ---------------------------------------------------------------------------
// SellerStatePricing — Mean item price and freight by seller state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerStatePricing {
    pub seller_state: String,
    pub avg_price: f64,
    pub avg_freight: f64,
}

// ---------------------------------------------------------------------------
// TopSeller — Items sold by one seller, with its location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSeller {
    pub seller_id: String,
    pub items_sold: i64,
    pub seller_city: Option<String>,
    pub seller_state: Option<String>,
}
