//! Local dataset directory and download cache for the Olist CSV tables.
//!
//! A table is resolved from a checked-out dataset directory first, then from
//! the cache directory, and only downloaded from the configured mirror when
//! neither has it. The dataset is static, so cached files never go stale.

use crate::config;
use crate::error::{InsightsError, Result};
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Locates and caches the Olist CSV tables.
pub struct CacheManager {
    /// Directory where downloaded files are stored.
    pub cache_dir: PathBuf,
    /// Optional directory holding the raw CSVs (checked before the cache).
    pub data_dir: Option<PathBuf>,
    /// Mirror serving the CSV files as `{base_url}/{file_name}`.
    pub base_url: Option<String>,
    /// If true, never download (use local and cached files only).
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
}

impl CacheManager {
    /// Create a new cache manager.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            data_dir: None,
            base_url: None,
            offline,
            timeout,
            client: None,
        })
    }

    /// Read tables from a local directory before touching the cache.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Set the mirror used for downloads. A trailing slash is ignored.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.map(|u| u.trim_end_matches('/').to_string());
        self
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| InsightsError::NotFound("HTTP client unavailable".to_string()))
    }

    /// Download a single file from the mirror into `dest`.
    ///
    /// The body is written to a temp file in the cache directory and renamed
    /// into place on success, so an interrupted download never leaves a
    /// partial CSV behind. Gzip payloads are decompressed on the way.
    fn download_file(&mut self, base_url: &str, filename: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/{}", base_url, filename);
        info!(%url, "downloading dataset table");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let client = self.client()?.clone();
        let resp = client.get(&url).send()?.error_for_status()?;
        let bytes = resp.bytes()?;

        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        if bytes.starts_with(&GZIP_MAGIC) {
            let mut decoder = GzDecoder::new(&bytes[..]);
            io::copy(&mut decoder, &mut tmp)?;
        } else {
            tmp.write_all(&bytes)?;
        }
        tmp.flush()?;
        tmp.persist(dest).map_err(|e| e.error)?;

        debug!(path = %dest.display(), "table cached");
        Ok(())
    }

    /// Ensure a table's CSV is available locally, downloading if needed.
    ///
    /// # Arguments
    ///
    /// * `table` - Logical table name (e.g. `"order_items"`, `"products"`).
    ///
    /// # Returns
    ///
    /// Local filesystem path to the CSV file.
    pub fn ensure_csv(&mut self, table: &str) -> Result<PathBuf> {
        let csv_files = config::csv_files();
        let filename = *csv_files
            .get(table)
            .ok_or_else(|| InsightsError::NotFound(format!("Unknown table: {}", table)))?;

        if let Some(dir) = &self.data_dir {
            let local = dir.join(filename);
            if local.exists() {
                return Ok(local);
            }
        }

        let cached = self.cache_dir.join(filename);
        if cached.exists() {
            return Ok(cached);
        }

        if self.offline {
            return Err(InsightsError::NotFound(format!(
                "Table file {} not available locally and offline mode is enabled",
                filename
            )));
        }

        let base_url = self.base_url.clone().ok_or_else(|| {
            InsightsError::NotFound(format!(
                "Table file {} not available locally and no dataset URL is configured",
                filename
            ))
        })?;

        self.download_file(&base_url, filename, &cached)?;
        Ok(cached)
    }

    /// Remove all cached files and recreate the cache directory.
    ///
    /// The local data directory is never touched.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Close the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
