//! TrendQuery tests: monthly category sales per customer state.

mod common;

use olist_insights::queries::trends::normalize_category;
use olist_insights::queries::TrendQuery;
use olist_insights::InsightsError;

/// Two spellings of one category, a blank customer state and an
/// unparsable purchase date.
fn trend_db() -> (olist_insights::Connection, tempfile::TempDir) {
    let (conn, tmp) = common::empty_db();
    common::register_csv(
        &conn,
        "products",
        "product_id,product_category_name\npa,Cama Mesa\npb,cama_mesa\npc,outros\n",
    );
    common::register_csv(
        &conn,
        "customers",
        "customer_id,customer_state\nc1,SP\nc2,RJ\nc3,\n",
    );
    common::register_csv(
        &conn,
        "orders",
        "order_id,customer_id,order_purchase_timestamp\n\
         o1,c1,2018-01-03 10:00:00\n\
         o2,c2,2018-01-20 09:30:00\n\
         o3,c1,2018-02-01 00:00:00\n\
         o4,c3,2018-02-10 12:00:00\n\
         o5,c1,not a date\n\
         o6,c2,2018-01-05 08:00:00\n",
    );
    common::register_csv(
        &conn,
        "order_items",
        "order_id,product_id\n\
         o1,pa\n\
         o1,pb\n\
         o2,pa\n\
         o3,pb\n\
         o4,pa\n\
         o5,pa\n\
         o6,pc\n",
    );
    (conn, tmp)
}

fn rows(conn: &olist_insights::Connection, category: &str) -> Vec<(String, String, i64)> {
    TrendQuery::new(conn)
        .monthly_by_state(category)
        .unwrap()
        .into_iter()
        .map(|r| (r.customer_state, r.year_month, r.num_orders))
        .collect()
}

#[test]
fn items_are_counted_per_state_and_month() {
    let (conn, _tmp) = trend_db();

    // o4 has no customer state and o5 no purchase date
    assert_eq!(
        rows(&conn, "cama_mesa"),
        vec![
            ("RJ".to_string(), "2018-01".to_string(), 1),
            ("SP".to_string(), "2018-01".to_string(), 2),
            ("SP".to_string(), "2018-02".to_string(), 1),
        ]
    );
}

#[test]
fn requested_category_is_normalized() {
    let (conn, _tmp) = trend_db();

    assert_eq!(rows(&conn, "Cama Mesa"), rows(&conn, "cama_mesa"));
}

#[test]
fn unknown_category_has_no_rows() {
    let (conn, _tmp) = trend_db();

    assert!(rows(&conn, "brinquedos").is_empty());
}

#[test]
fn sample_dataset_trend() {
    let (conn, _tmp) = common::setup_sample_db();

    assert_eq!(
        rows(&conn, "cama_mesa_banho"),
        vec![
            ("SP".to_string(), "2017-05".to_string(), 1),
            ("SP".to_string(), "2017-10".to_string(), 1),
        ]
    );
}

#[test]
fn category_names_normalize_to_snake_case() {
    assert_eq!(normalize_category("Cama Mesa"), "cama_mesa");
    assert_eq!(normalize_category("casa_construcao"), "casa_construcao");
    assert_eq!(normalize_category("Moveis & Decoracao"), "moveis__decoracao");
    assert_eq!(normalize_category("Construção"), "construo");
}

#[test]
fn missing_customer_state_column_fails_fast() {
    let (conn, _tmp) = common::empty_db();
    common::register_csv(&conn, "products", "product_id,product_category_name
pa,a
");
    common::register_csv(&conn, "customers", "customer_id,customer_city
c1,campinas
");
    common::register_csv(
        &conn,
        "orders",
        "order_id,customer_id,order_purchase_timestamp
o1,c1,2018-01-01 00:00:00
",
    );
    common::register_csv(&conn, "order_items", "order_id,product_id
o1,pa
");

    let err = TrendQuery::new(&conn).monthly_by_state("a").unwrap_err();
    assert!(matches!(
        err,
        InsightsError::MissingField { ref column, .. } if column == "customer_state"
    ));
}
