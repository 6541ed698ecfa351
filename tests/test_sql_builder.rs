//! Unit tests for the SqlBuilder query construction and the coercion helpers.

mod common;

use olist_insights::sql_builder::{
    numeric_or_null, numeric_or_zero, text_or_null, whole_days_between,
};
use olist_insights::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("order_items").build();
    assert_eq!(sql, "SELECT *\nFROM order_items");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("order_items")
        .select(&["order_id", "price"])
        .build();
    assert!(sql.starts_with("SELECT order_id, price\n"));
}

#[test]
fn select_accepts_owned_strings() {
    let cols = vec!["product_id".to_string(), numeric_or_zero("price")];
    let (sql, _) = SqlBuilder::new("order_items").select(&cols).build();
    assert!(sql.starts_with("SELECT product_id, COALESCE("));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_clause_adds_condition_with_params() {
    let (sql, params) = SqlBuilder::new("orders")
        .where_clause("order_status = ?", &["delivered"])
        .build();
    assert!(sql.contains("WHERE order_status = ?"));
    assert_eq!(params, vec!["delivered"]);
}

#[test]
fn where_clauses_are_joined_with_and_in_order() {
    let (sql, params) = SqlBuilder::new("customers")
        .where_clause("customer_state = ?", &["SP"])
        .where_clause("customer_city LIKE ?", &["sao%"])
        .build();
    assert!(sql.contains("WHERE customer_state = ? AND customer_city LIKE ?"));
    assert_eq!(params, vec!["SP", "sao%"]);
}

// ---------------------------------------------------------------------------
// JOIN / GROUP BY / ORDER BY / LIMIT
// ---------------------------------------------------------------------------

#[test]
fn full_query_with_join_and_grouping() {
    let (sql, params) = SqlBuilder::new("order_items i")
        .select(&["p.product_category_name", "COUNT(*) AS qty"])
        .join("LEFT JOIN products p ON i.product_id = p.product_id")
        .where_clause("i.seller_id = ?", &["s1"])
        .group_by(&["p.product_category_name"])
        .order_by(&["qty DESC"])
        .limit(5)
        .build();

    assert_eq!(
        sql,
        "SELECT p.product_category_name, COUNT(*) AS qty\n\
         FROM order_items i\n\
         LEFT JOIN products p ON i.product_id = p.product_id\n\
         WHERE i.seller_id = ?\n\
         GROUP BY p.product_category_name\n\
         ORDER BY qty DESC\n\
         LIMIT 5"
    );
    assert_eq!(params, vec!["s1"]);
}

#[test]
fn built_query_runs_against_duckdb() {
    let (conn, _tmp) = common::setup_sample_db();

    let (sql, params) = SqlBuilder::new("customers")
        .select(&["customer_state", "COUNT(*) AS n"])
        .where_clause("customer_city <> ?", &["belo horizonte"])
        .group_by(&["customer_state"])
        .order_by(&["customer_state"])
        .limit(5)
        .build();
    let rows = conn.execute(&sql, &params).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["customer_state"], "RJ");
    assert_eq!(rows[1]["customer_state"], "SP");
    assert_eq!(rows[1]["n"], 3);
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

#[test]
fn numeric_or_zero_coerces_bad_values_to_zero() {
    let (conn, _tmp) = common::empty_db();

    let sql = format!(
        "SELECT {} AS v FROM (VALUES ('12.5'), ('abc'), (NULL), ('inf'), ('3')) t(x)",
        numeric_or_zero("x")
    );
    let rows = conn.execute(&sql, &[]).unwrap();
    let values: Vec<f64> = rows.iter().map(|r| r["v"].as_f64().unwrap()).collect();
    assert_eq!(values, vec![12.5, 0.0, 0.0, 0.0, 3.0]);
}

#[test]
fn numeric_or_null_keeps_missing_values_null() {
    let (conn, _tmp) = common::empty_db();

    let sql = format!(
        "SELECT {} AS v FROM (VALUES ('700'), (''), ('nan')) t(x)",
        numeric_or_null("x")
    );
    let rows = conn.execute(&sql, &[]).unwrap();
    assert_eq!(rows[0]["v"].as_f64(), Some(700.0));
    assert!(rows[1]["v"].is_null());
    assert!(rows[2]["v"].is_null());
}

#[test]
fn text_or_null_maps_blank_to_null() {
    let (conn, _tmp) = common::empty_db();

    let sql = format!(
        "SELECT {} AS v FROM (VALUES ('moveis'), ('   '), ('')) t(x)",
        text_or_null("x")
    );
    let rows = conn.execute(&sql, &[]).unwrap();
    assert_eq!(rows[0]["v"], "moveis");
    assert!(rows[1]["v"].is_null());
    assert!(rows[2]["v"].is_null());
}

#[test]
fn whole_days_between_rounds_down_and_tolerates_bad_dates() {
    let (conn, _tmp) = common::empty_db();

    let sql = format!(
        "SELECT {} AS d FROM (VALUES \
            ('2017-10-02 10:56:33', '2017-10-10 21:25:13'), \
            ('2018-08-10 08:00:00', '2018-08-13 07:00:00'), \
            ('2018-01-01 00:00:00', NULL), \
            ('garbage', '2018-01-02 00:00:00')) t(a, b)",
        whole_days_between("a", "b")
    );
    let rows = conn.execute(&sql, &[]).unwrap();
    assert_eq!(rows[0]["d"].as_f64(), Some(8.0));
    assert_eq!(rows[1]["d"].as_f64(), Some(2.0));
    assert!(rows[2]["d"].is_null());
    assert!(rows[3]["d"].is_null());
}
