//! Query modules over the Olist tables.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection), registers the tables it
//! needs on first use and returns typed rows.

pub mod freight;
pub mod installments;
pub mod items;
pub mod micro_markets;
pub mod product_insights;
pub mod products;
pub mod sellers;
pub mod trends;

pub use freight::FreightQuery;
pub use installments::InstallmentQuery;
pub use items::ItemQuery;
pub use micro_markets::MicroMarketQuery;
pub use product_insights::ProductInsightQuery;
pub use products::ProductQuery;
pub use sellers::SellerQuery;
pub use trends::TrendQuery;
