//! End-to-end smoke test over the real Olist dataset.
//!
//! Reads the CSVs from `OLIST_DATA_DIR` (or downloads them from
//! `OLIST_DATASET_URL`) and runs every analysis.
//!
//! Run with:
//! ```sh
//! OLIST_DATA_DIR=datasets/raw cargo test -- --ignored --nocapture
//! ```

use olist_insights::{report, MarginConfig, OlistInsights};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Print a section header to stderr.
fn section(name: &str) {
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("  {}", name);
    eprintln!("{}", "=".repeat(60));
}

/// Counters for pass/fail reporting.
struct Counters {
    pass: usize,
    fail: usize,
}

impl Counters {
    fn new() -> Self {
        Self { pass: 0, fail: 0 }
    }

    fn check(&mut self, label: &str, condition: bool, detail: &str) {
        let status = if condition { "PASS" } else { "FAIL" };
        if condition {
            self.pass += 1;
        } else {
            self.fail += 1;
        }
        if detail.is_empty() {
            eprintln!("  [{}] {}", status, label);
        } else {
            eprintln!("  [{}] {} -- {}", status, label, detail);
        }
    }
}

fn open() -> OlistInsights {
    let mut builder = OlistInsights::builder();
    if let Ok(dir) = std::env::var("OLIST_DATA_DIR") {
        builder = builder.data_dir(dir);
    }
    if let Ok(url) = std::env::var("OLIST_DATASET_URL") {
        builder = builder.base_url(url);
    }
    builder.build().unwrap()
}

// ---------------------------------------------------------------------------
// Main smoke test
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn smoke_test() {
    let insights = open();
    let mut c = Counters::new();

    section("Tables");
    let items = insights.items().all().unwrap();
    c.check("order items load", !items.is_empty(), &format!("{} rows", items.len()));
    let products = insights.products().all().unwrap();
    c.check("products load", !products.is_empty(), &format!("{} rows", products.len()));

    section("Margin");
    let report = insights.margin().run(&MarginConfig::default()).unwrap();
    c.check("categories ranked", report.len() > 50, &format!("{} categories", report.len()));
    let deltas: Vec<f64> = report
        .rows
        .iter()
        .map(|r| r.primary().unwrap().delta_margin_total)
        .collect();
    c.check("ranking non-increasing", deltas.windows(2).all(|w| w[0] >= w[1]), "");
    c.check(
        "cost factors bounded",
        report
            .rows
            .iter()
            .all(|r| (0.9..=1.5).contains(&r.economics.cost_factor)),
        "",
    );
    let estimated = report
        .rows
        .iter()
        .filter(|r| r.economics.price_elasticity.is_some())
        .count();
    c.check("some elasticities estimated", estimated > 0, &format!("{}", estimated));

    let tmp = tempfile::tempdir().unwrap();
    let outputs = report::export_margin(&report, tmp.path(), 15).unwrap();
    c.check("chart written", outputs.chart.is_some(), "");

    section("Installments");
    let segments = insights.installments().summary().unwrap();
    c.check("four segments", segments.len() == 4, &format!("{:?}", segments.len()));

    section("Micro-markets");
    let candidates = insights.micro_markets().candidates().unwrap();
    c.check(
        "candidates above floor",
        candidates.iter().all(|m| m.order_count >= 50),
        &format!("{} candidates", candidates.len()),
    );

    section("Freight");
    let states = insights.freight().by_state().unwrap();
    c.check("27 states", states.len() == 27, &format!("{}", states.len()));
    let above = insights.freight().above_average().unwrap();
    c.check("some states above average", !above.is_empty(), "");

    section("Products");
    let top = insights.product_insights().top_categories(8).unwrap();
    c.check("eight top categories", top.len() == 8, &format!("{}", top.len()));
    let photos = insights.product_insights().orders_by_photos().unwrap();
    c.check("photo counts grouped", !photos.is_empty(), &format!("{} groups", photos.len()));

    section("Sellers");
    let sellers = insights.sellers().by_state().unwrap();
    c.check("sellers in SP lead", sellers.first().map(|s| s.state.as_str()) == Some("SP"), "");
    let delivery = insights.sellers().delivery_by_state().unwrap();
    c.check(
        "delivery medians positive",
        delivery.iter().all(|d| d.median_delivery_days >= 1.0),
        &format!("{} states", delivery.len()),
    );

    section("Trends");
    let trend = insights.trends().monthly_by_state("casa_construcao").unwrap();
    c.check("trend has rows", !trend.is_empty(), &format!("{} rows", trend.len()));

    eprintln!("\n{}", insights);
    eprintln!("\nPASS: {}  FAIL: {}", c.pass, c.fail);
    assert_eq!(c.fail, 0);
}
