//! DuckDB connection wrapper with table registration and query execution.
//!
//! CSV tables are registered with every column read as VARCHAR; numeric
//! coercion happens in the query layer so malformed cells follow one policy.

use crate::cache::CacheManager;
use crate::error::{InsightsError, Result};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Wraps a DuckDB connection and registers dataset CSVs as views.
pub struct Connection {
    conn: DuckDbConnection,
    /// The cache manager used to locate/download table files.
    pub cache: RefCell<CacheManager>,
    registered_views: RefCell<HashSet<String>>,
}

impl Connection {
    /// Create a connection backed by the given cache.
    ///
    /// Opens an in-memory DuckDB database.
    pub fn new(cache: CacheManager) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            cache: RefCell::new(cache),
            registered_views: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure one or more tables are registered, downloading data if needed.
    pub fn ensure_tables(&self, tables: &[&str]) -> Result<()> {
        for name in tables {
            if !self.has_view(name) {
                self.ensure_table(name)?;
            }
        }
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Automatically converts DuckDB types to `serde_json::Value`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only valid after the statement has run
        let stmt_ref = rows_result.as_ref().ok_or_else(|| {
            InsightsError::NotFound("statement metadata unavailable".to_string())
        })?;
        let column_names: Vec<String> = stmt_ref
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let column_count = stmt_ref.column_count();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate() {
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(
                row.into_iter().collect::<serde_json::Map<String, serde_json::Value>>(),
            );
            let item: T = serde_json::from_value(value)?;
            results.push(item);
        }
        Ok(results)
    }

    /// Create a DuckDB table from a CSV file with a header row.
    ///
    /// All columns are read as VARCHAR, matching lazily registered views.
    pub fn register_table_from_csv(&self, table_name: &str, csv_path: &str) -> Result<()> {
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM {}",
            table_name,
            table_name,
            read_csv_expr(csv_path)
        ))?;
        self.registered_views.borrow_mut().insert(table_name.to_string());
        Ok(())
    }

    /// Column names of a registered table, in file order.
    pub fn columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT column_name FROM (DESCRIBE SELECT * FROM {})",
            table
        ))?;
        let mut rows = stmt.query([])?;
        let mut cols = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            cols.push(name);
        }
        Ok(cols)
    }

    /// Fail with [`InsightsError::MissingField`] unless every column exists.
    pub fn require_columns(&self, table: &str, required: &[&str]) -> Result<HashSet<String>> {
        let present: HashSet<String> = self.columns(table)?.into_iter().collect();
        for col in required {
            if !present.contains(*col) {
                return Err(InsightsError::MissingField {
                    table: table.to_string(),
                    column: col.to_string(),
                });
            }
        }
        Ok(present)
    }

    /// Check whether a view has been registered.
    pub fn has_view(&self, name: &str) -> bool {
        self.registered_views.borrow().contains(name)
    }

    /// Return a list of all registered view names, sorted.
    pub fn views(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registered_views.borrow().iter().cloned().collect();
        names.sort();
        names
    }

    /// Clear all registered views so they will be re-created on next access.
    pub fn reset_views(&self) {
        self.registered_views.borrow_mut().clear();
    }

    /// Lazily register a dataset CSV as a DuckDB view.
    fn ensure_table(&self, table: &str) -> Result<()> {
        if self.registered_views.borrow().contains(table) {
            return Ok(());
        }

        let path = self.cache.borrow_mut().ensure_csv(table)?;
        let path_str = path.to_string_lossy().to_string();

        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM {}",
            table,
            read_csv_expr(&path_str)
        ))?;
        self.registered_views.borrow_mut().insert(table.to_string());
        debug!(table, path = %path_str, "registered view");

        Ok(())
    }
}

/// `read_csv(...)` call reading every column as text.
fn read_csv_expr(path: &str) -> String {
    // Forward slashes for DuckDB on Windows, quotes doubled for the literal
    let path = path.replace('\\', "/").replace('\'', "''");
    format!("read_csv('{}', header = true, all_varchar = true)", path)
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; try i64, fallback to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => serde_json::Value::Null,
    }
}
