//! Shared test fixtures for the olist-insights integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB connection
//! populated with small Olist-shaped tables (order_items, products, orders,
//! customers, order_payments, geolocation, sellers) via CSV temp files.

#![allow(dead_code)]

use olist_insights::{CacheManager, Connection};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const ORDER_ITEMS_CSV: &str = "\
order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value
o1,1,p1,s1,2017-09-19 09:45:35,100.00,10.00
o2,1,p2,s1,2017-05-03 11:05:13,abc,12.00
o3,1,p3,s2,2018-01-18 14:48:30,1000.00,50.00
o4,1,p4,s2,2018-08-15 10:10:18,30.00,5.00
o5,1,p5,s3,2017-02-13 13:57:51,200.00,20.00
o6,1,p9,s3,2017-07-05 02:44:11,10.00,1.00
o7,1,,s3,2017-07-05 02:44:11,15.00,1.50
";

pub const PRODUCTS_CSV: &str = "\
product_id,product_category_name,product_name_lenght,product_description_lenght,product_photos_qty,product_weight_g,product_length_cm,product_height_cm,product_width_cm
p1,cama_mesa_banho,40,287,1,500,20,10,15
p2,cama_mesa_banho,44,276,1,700,30,10,20
p3,informatica_acessorios,46,250,1,1500,40,10,30
p4,,60,100,2,100,10,5,5
p5,moveis_decoracao,29,1045,1,,,,
";

pub const ORDERS_CSV: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date
o1,c1,delivered,2017-10-02 10:56:33,2017-10-02 11:07:15,2017-10-04 19:55:00,2017-10-10 21:25:13,2017-10-18 00:00:00
o2,c2,delivered,2017-05-01 10:00:00,2017-05-01 10:10:00,,,2017-05-20 00:00:00
o3,c3,delivered,2018-01-15 09:00:00,2018-01-15 09:30:00,2018-01-16 10:00:00,2018-01-20 12:00:00,2018-01-30 00:00:00
o4,c4,delivered,2018-08-10 08:00:00,2018-08-10 08:10:00,2018-08-11 10:00:00,2018-08-13 07:00:00,2018-08-25 00:00:00
o5,c5,delivered,2017-02-10 12:00:00,2017-02-10 12:20:00,2017-02-12 10:00:00,2017-02-20 12:00:00,2017-03-01 00:00:00
o6,c6,canceled,2017-07-01 15:00:00,,,,2017-07-20 00:00:00
";

pub const CUSTOMERS_CSV: &str = "\
customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state
c1,u1,01001,sao paulo,SP
c2,u2,01001,sao paulo,SP
c3,u3,20000,rio de janeiro,RJ
c4,u4,20000,rio de janeiro,RJ
c5,u5,30100,belo horizonte,MG
c6,u6,01001,sao paulo,SP
";

pub const ORDER_PAYMENTS_CSV: &str = "\
order_id,payment_sequential,payment_type,payment_installments,payment_value
o1,1,credit_card,1,110.00
o2,1,credit_card,3,12.00
o3,1,credit_card,8,1050.00
o4,1,boleto,1,35.00
o5,1,credit_card,5,220.00
o6,1,voucher,,11.00
";

pub const GEOLOCATION_CSV: &str = "\
geolocation_zip_code_prefix,geolocation_lat,geolocation_lng,geolocation_city,geolocation_state
01001,-23.55,-46.63,sao paulo,SP
01001,-23.56,-46.64,sao paulo,SP
01001,-23.57,-46.65,sao paulo,SP
";

pub const SELLERS_CSV: &str = "\
seller_id,seller_zip_code_prefix,seller_city,seller_state
s1,13023,campinas,SP
s2,13844,mogi guacu,SP
s3,20031,rio de janeiro,RJ
s4,04195,sao paulo,SP
s5,88000,florianopolis,
";

/// Create a `Connection` backed by a temporary, offline cache directory with
/// the sample tables registered.
///
/// Returns `(Connection, tempfile::TempDir)`. The caller must keep the `TempDir`
/// alive for the duration of the test so the cache directory is not deleted
/// prematurely.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    let (conn, tmp_dir) = empty_db();

    register_csv(&conn, "order_items", ORDER_ITEMS_CSV);
    register_csv(&conn, "products", PRODUCTS_CSV);
    register_csv(&conn, "orders", ORDERS_CSV);
    register_csv(&conn, "customers", CUSTOMERS_CSV);
    register_csv(&conn, "order_payments", ORDER_PAYMENTS_CSV);
    register_csv(&conn, "geolocation", GEOLOCATION_CSV);
    register_csv(&conn, "sellers", SELLERS_CSV);

    (conn, tmp_dir)
}

/// An offline connection with nothing registered.
pub fn empty_db() -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(
        Some(tmp_dir.path().join("cache")),
        true,
        Duration::from_secs(30),
    )
    .unwrap();
    let conn = Connection::new(cache).unwrap();
    (conn, tmp_dir)
}

/// Write CSV text to a temp file and register it as a DuckDB table via
/// `Connection::register_table_from_csv`.
pub fn register_csv(conn: &Connection, table_name: &str, contents: &str) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_csv(table_name, path).unwrap();
    // DuckDB has copied the rows into an in-memory table, so the temp file
    // can go.
}

/// Assert two floats agree to within `tol`.
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {} to be within {} of {}",
        actual,
        tol,
        expected
    );
}
