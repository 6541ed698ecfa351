//! Connection integration tests: raw SQL execution, CSV registration,
//! schema checks and lazy view resolution.

mod common;

use olist_insights::{CacheManager, Connection, InsightsError};
use std::fs;
use std::time::Duration;

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

#[test]
fn execute_returns_correct_rows() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute("SELECT * FROM customers ORDER BY customer_id", &[])
        .unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["customer_id"], "c1");
    assert_eq!(rows[5]["customer_id"], "c6");
}

#[test]
fn execute_with_params() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute(
            "SELECT * FROM customers WHERE customer_state = ?",
            &["SP".to_string()],
        )
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn execute_returns_empty_for_no_matches() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute(
            "SELECT * FROM orders WHERE order_id = ?",
            &["nonexistent".to_string()],
        )
        .unwrap();
    assert!(rows.is_empty());
}

// ---------------------------------------------------------------------------
// register_table_from_csv
// ---------------------------------------------------------------------------

#[test]
fn csv_columns_are_read_as_text() {
    let (conn, _tmp) = common::setup_sample_db();

    // Leading zeros survive because nothing is sniffed as numeric
    let rows = conn
        .execute(
            "SELECT customer_zip_code_prefix FROM customers WHERE customer_id = ?",
            &["c1".to_string()],
        )
        .unwrap();
    assert_eq!(rows[0]["customer_zip_code_prefix"], "01001");
}

#[test]
fn register_table_marks_view_as_registered() {
    let (conn, _tmp) = common::empty_db();

    assert!(!conn.has_view("sellers"));
    common::register_csv(&conn, "sellers", "seller_id,seller_state\ns1,SP\n");
    assert!(conn.has_view("sellers"));
}

#[test]
fn register_table_replaces_existing_table() {
    let (conn, _tmp) = common::empty_db();

    common::register_csv(&conn, "replaceable", "val\nold\n");
    common::register_csv(&conn, "replaceable", "val\nnew\n");

    let rows = conn.execute("SELECT * FROM replaceable", &[]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["val"], "new");
}

// ---------------------------------------------------------------------------
// columns / require_columns
// ---------------------------------------------------------------------------

#[test]
fn columns_are_listed_in_file_order() {
    let (conn, _tmp) = common::setup_sample_db();

    let cols = conn.columns("order_payments").unwrap();
    assert_eq!(
        cols,
        vec![
            "order_id",
            "payment_sequential",
            "payment_type",
            "payment_installments",
            "payment_value"
        ]
    );
}

#[test]
fn require_columns_reports_the_missing_column() {
    let (conn, _tmp) = common::setup_sample_db();

    let err = conn
        .require_columns("orders", &["order_id", "seller_id"])
        .unwrap_err();
    match err {
        InsightsError::MissingField { table, column } => {
            assert_eq!(table, "orders");
            assert_eq!(column, "seller_id");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn require_columns_returns_present_set() {
    let (conn, _tmp) = common::setup_sample_db();

    let present = conn.require_columns("products", &["product_id"]).unwrap();
    assert!(present.contains("product_weight_g"));
    assert_eq!(present.len(), 9);
}

// ---------------------------------------------------------------------------
// has_view / views / reset_views
// ---------------------------------------------------------------------------

#[test]
fn has_view_returns_false_initially() {
    let (conn, _tmp) = common::empty_db();

    assert!(!conn.has_view("orders"));
    assert!(conn.views().is_empty());
}

#[test]
fn views_returns_all_registered_view_names_sorted() {
    let (conn, _tmp) = common::setup_sample_db();

    assert_eq!(
        conn.views(),
        vec![
            "customers",
            "geolocation",
            "order_items",
            "order_payments",
            "orders",
            "products",
            "sellers"
        ]
    );
}

#[test]
fn reset_views_clears_registered_views() {
    let (conn, _tmp) = common::setup_sample_db();

    conn.reset_views();

    assert!(conn.views().is_empty());
    assert!(!conn.has_view("orders"));
}

// ---------------------------------------------------------------------------
// execute_into
// ---------------------------------------------------------------------------

#[test]
fn execute_into_deserializes_rows() {
    let (conn, _tmp) = common::setup_sample_db();

    #[derive(serde::Deserialize, Debug)]
    struct Payment {
        order_id: String,
        installments: Option<i64>,
    }

    let rows: Vec<Payment> = conn
        .execute_into(
            "SELECT order_id, TRY_CAST(payment_installments AS BIGINT) AS installments \
             FROM order_payments ORDER BY order_id",
            &[],
        )
        .unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[2].order_id, "o3");
    assert_eq!(rows[2].installments, Some(8));
    assert_eq!(rows[5].installments, None);
}

// ---------------------------------------------------------------------------
// Lazy table resolution through the cache
// ---------------------------------------------------------------------------

#[test]
fn ensure_tables_reads_from_data_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("raw");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("olist_sellers_dataset.csv"),
        "seller_id,seller_zip_code_prefix,seller_city,seller_state\ns1,13023,campinas,SP\n",
    )
    .unwrap();

    let cache = CacheManager::new(Some(tmp.path().join("cache")), true, Duration::from_secs(5))
        .unwrap()
        .with_data_dir(Some(data_dir));
    let conn = Connection::new(cache).unwrap();

    conn.ensure_tables(&["sellers"]).unwrap();
    assert!(conn.has_view("sellers"));
    let rows = conn
        .execute("SELECT COUNT(*) AS n FROM sellers", &[])
        .unwrap();
    assert_eq!(rows[0]["n"], 1);
}

#[test]
fn ensure_tables_falls_back_to_cache_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let cache_dir = tmp.path().join("cache");
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(
        cache_dir.join("olist_order_reviews_dataset.csv"),
        "review_id,order_id,review_score\nr1,o1,5\nr2,o2,3\n",
    )
    .unwrap();

    let cache = CacheManager::new(Some(cache_dir), true, Duration::from_secs(5)).unwrap();
    let conn = Connection::new(cache).unwrap();

    conn.ensure_tables(&["order_reviews"]).unwrap();
    let rows = conn
        .execute("SELECT review_id FROM order_reviews ORDER BY review_id", &[])
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn offline_missing_table_is_not_found() {
    let (conn, _tmp) = common::empty_db();

    let err = conn.ensure_tables(&["orders"]).unwrap_err();
    assert!(matches!(err, InsightsError::NotFound(_)));
    assert!(!conn.has_view("orders"));
}

#[test]
fn unknown_table_is_not_found() {
    let (conn, _tmp) = common::empty_db();

    let err = conn.ensure_tables(&["no_such_table"]).unwrap_err();
    assert!(err.to_string().contains("Unknown table"));
}

#[test]
fn online_without_base_url_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(Some(tmp.path().to_path_buf()), false, Duration::from_secs(5))
        .unwrap();
    let conn = Connection::new(cache).unwrap();

    let err = conn.ensure_tables(&["products"]).unwrap_err();
    assert!(err.to_string().contains("no dataset URL"));
}
