//! Exploratory analyses over the Olist Brazilian e-commerce dataset.
//!
//! The dataset CSVs are located in a local directory, a cache, or downloaded
//! from a configured mirror, then queried in-process via DuckDB. The main
//! analysis estimates latent margin per product category: a physical cost
//! proxy, a log-log price elasticity and the margin effect of uniform price
//! increases.
//!
//! # Quick start
//!
//! ```no_run
//! use olist_insights::{MarginConfig, OlistInsights};
//!
//! let insights = OlistInsights::builder()
//!     .data_dir("data/raw")
//!     .offline(true)
//!     .build()
//!     .unwrap();
//!
//! let report = insights.margin().run(&MarginConfig::default()).unwrap();
//! for row in report.top(5).unwrap_or_default() {
//!     println!("{}: {:?}", row.category(), row.primary());
//! }
//! ```

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod margin;
pub mod models;
pub mod queries;
pub mod report;
pub mod sql_builder;
pub mod stats;

pub use cache::CacheManager;
pub use config::MarginConfig;
pub use connection::Connection;
pub use error::{InsightsError, Result};
pub use margin::MarginReport;
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// OlistInsightsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`OlistInsights`] instance.
pub struct OlistInsightsBuilder {
    data_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    base_url: Option<String>,
    offline: bool,
    timeout: Duration,
}

impl Default for OlistInsightsBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            cache_dir: None,
            base_url: None,
            offline: false,
            timeout: Duration::from_secs(120),
        }
    }
}

impl OlistInsightsBuilder {
    /// Directory holding the extracted `olist_*.csv` files.
    ///
    /// Files found here are used in place and never copied to the cache.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set a custom cache directory for downloaded files.
    ///
    /// Defaults to the platform cache directory (e.g. `~/.cache/olist-insights`
    /// on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Base URL of a mirror serving the dataset CSVs by file name.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Never download; only use local and cached files. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for downloads. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client. No table is read until the first query needs it.
    pub fn build(self) -> Result<OlistInsights> {
        let cache = CacheManager::new(self.cache_dir, self.offline, self.timeout)?
            .with_data_dir(self.data_dir)
            .with_base_url(self.base_url);
        let conn = Connection::new(cache)?;
        Ok(OlistInsights { conn })
    }
}

// ---------------------------------------------------------------------------
// OlistInsights
// ---------------------------------------------------------------------------

/// Entry point: owns the [`Connection`] and hands out borrowing query
/// interfaces.
pub struct OlistInsights {
    conn: Connection,
}

impl OlistInsights {
    pub fn builder() -> OlistInsightsBuilder {
        OlistInsightsBuilder::default()
    }

    /// Wrap an existing connection, e.g. one with tables registered by hand.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Query accessors ---------------------------------------------------

    pub fn items(&self) -> queries::ItemQuery<'_> {
        queries::ItemQuery::new(&self.conn)
    }

    pub fn products(&self) -> queries::ProductQuery<'_> {
        queries::ProductQuery::new(&self.conn)
    }

    /// Customer lifetime value by installment behaviour.
    pub fn installments(&self) -> queries::InstallmentQuery<'_> {
        queries::InstallmentQuery::new(&self.conn)
    }

    /// Zip prefix statistics and candidate micro-markets.
    pub fn micro_markets(&self) -> queries::MicroMarketQuery<'_> {
        queries::MicroMarketQuery::new(&self.conn)
    }

    /// Freight share of purchase price by customer state.
    pub fn freight(&self) -> queries::FreightQuery<'_> {
        queries::FreightQuery::new(&self.conn)
    }

    /// Items sold by product category, photo count, description length
    /// and volume.
    pub fn product_insights(&self) -> queries::ProductInsightQuery<'_> {
        queries::ProductInsightQuery::new(&self.conn)
    }

    /// Seller distribution, volume, niches and delivery times by state.
    pub fn sellers(&self) -> queries::SellerQuery<'_> {
        queries::SellerQuery::new(&self.conn)
    }

    /// Monthly sales of a category by customer state.
    pub fn trends(&self) -> queries::TrendQuery<'_> {
        queries::TrendQuery::new(&self.conn)
    }

    /// The category margin simulation over `order_items` and `products`.
    pub fn margin(&self) -> margin::MarginSimulator<'_> {
        margin::MarginSimulator::new(&self.conn)
    }

    // -- Utility methods ---------------------------------------------------

    /// Registered table names. Tables are registered lazily, so this grows
    /// as different analyses run.
    pub fn views(&self) -> Vec<String> {
        self.conn.views()
    }

    /// Execute a raw SQL query with `?` placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Delete downloaded files and drop every registered view.
    pub fn clear_cache(&self) -> Result<()> {
        self.conn.cache.borrow().clear()?;
        self.conn.reset_views();
        Ok(())
    }

    /// Consume the client and release the database and HTTP client.
    pub fn close(self) {
        self.conn.cache.borrow_mut().close();
        drop(self);
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for OlistInsights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let views = self.conn.views();
        let cache = self.conn.cache.borrow();
        let data_dir = cache
            .data_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "OlistInsights(data_dir={}, cache_dir={}, views=[{}], offline={})",
            data_dir,
            cache.cache_dir.display(),
            views.join(", "),
            cache.offline
        )
    }
}
