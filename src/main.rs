use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use olist_insights::config::{
    DEFAULT_COST_RATIO, DEFAULT_OUTPUT_DIR, DEFAULT_PRICE_INCREASES, DEFAULT_TOP_CATEGORIES,
    DEFAULT_TOP_N, DEFAULT_TOP_SELLERS, DEFAULT_TREND_CATEGORY,
};
use olist_insights::queries::freight::above_average;
use olist_insights::queries::micro_markets::{candidate_threshold, select_candidates};
use olist_insights::queries::trends::normalize_category;
use olist_insights::{report, MarginConfig, OlistInsights};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace};

/// Category margin simulation and exploratory summaries over the Olist dataset
#[derive(Parser)]
#[command(name = "olist-insights", version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the extracted olist_*.csv files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Cache directory for downloaded tables
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Mirror serving the dataset CSVs by file name
    #[arg(long, env = "OLIST_DATASET_URL", global = true)]
    base_url: Option<String>,

    /// Never download; use local and cached files only
    #[arg(long, global = true)]
    offline: bool,

    /// Directory the tables and charts are written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, global = true)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank categories by the margin gained from price increases
    Margin(MarginArgs),
    /// Customer lifetime value by installment segment
    Installments,
    /// Candidate micro-markets by customer zip prefix
    MicroMarkets,
    /// Freight share of purchase price by customer state
    Freight,
    /// Items sold by category, photo count, description length and volume
    ProductInsights,
    /// Seller distribution, volume, niches and delivery times by state
    Sellers,
    /// Monthly sales of one category by customer state
    Trends(TrendArgs),
    /// Run every analysis
    All(MarginArgs),
}

#[derive(Args)]
struct TrendArgs {
    /// Product category, as named in the products table
    #[arg(long, default_value = DEFAULT_TREND_CATEGORY)]
    category: String,
}

#[derive(Args)]
struct MarginArgs {
    /// Share of the average price taken as base unit cost
    #[arg(long, default_value_t = DEFAULT_COST_RATIO)]
    cost_ratio: f64,

    /// Price increases to simulate, as fractions (the first drives the ranking)
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_PRICE_INCREASES,
        conflicts_with = "no_scenarios"
    )]
    scenarios: Vec<f64>,

    /// Simulate nothing and rank by current margin
    #[arg(long)]
    no_scenarios: bool,

    /// Number of categories in the chart
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
}

impl MarginArgs {
    fn config(&self) -> MarginConfig {
        let scenarios = if self.no_scenarios {
            Vec::new()
        } else {
            self.scenarios.clone()
        };
        MarginConfig::new(self.cost_ratio, scenarios)
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("olist-insights started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        report_failure(&e);
        std::process::exit(1);
    }
}

fn report_failure(e: &anyhow::Error) {
    error!("Fatal error: {:#}", e);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut builder = OlistInsights::builder().offline(cli.offline);
    if let Some(dir) = &cli.data_dir {
        builder = builder.data_dir(dir);
    }
    if let Some(dir) = &cli.cache_dir {
        builder = builder.cache_dir(dir);
    }
    if let Some(url) = &cli.base_url {
        builder = builder.base_url(url.as_str());
    }
    let insights = builder.build().context("failed to open the dataset")?;
    debug!("{}", insights);

    let out = cli.output_dir.as_path();
    match &cli.command {
        Commands::Margin(args) => run_margin(&insights, args, out)?,
        Commands::Installments => run_installments(&insights, out)?,
        Commands::MicroMarkets => run_micro_markets(&insights, out)?,
        Commands::Freight => run_freight(&insights, out)?,
        Commands::ProductInsights => run_product_insights(&insights, out)?,
        Commands::Sellers => run_sellers(&insights, out)?,
        Commands::Trends(args) => run_trends(&insights, &args.category, out)?,
        Commands::All(args) => {
            run_margin(&insights, args, out)?;
            run_installments(&insights, out)?;
            run_micro_markets(&insights, out)?;
            run_freight(&insights, out)?;
            run_product_insights(&insights, out)?;
            run_sellers(&insights, out)?;
            run_trends(&insights, DEFAULT_TREND_CATEGORY, out)?;
        }
    }

    insights.close();
    Ok(())
}

fn run_margin(insights: &OlistInsights, args: &MarginArgs, out: &Path) -> anyhow::Result<()> {
    let config = args.config();
    let report = insights
        .margin()
        .run(&config)
        .context("margin simulation failed")?;
    let outputs = report::export_margin(&report, out, args.top)?;

    println!("Ranking table: {}", outputs.table.display());
    match &outputs.chart {
        Some(chart) => println!("Chart: {}", chart.display()),
        None => println!("Chart: skipped"),
    }
    for row in report.rows.iter().take(args.top.min(5)) {
        match row.primary() {
            Some(s) => println!(
                "  {:<40} delta {:>14.2} (elasticity {:.3})",
                row.category(),
                s.delta_margin_total,
                s.elasticity_used
            ),
            None => println!(
                "  {:<40} margin {:>14.2}",
                row.category(),
                row.economics.current_margin_total
            ),
        }
    }
    Ok(())
}

fn run_installments(insights: &OlistInsights, out: &Path) -> anyhow::Result<()> {
    let segments = insights
        .installments()
        .summary()
        .context("installment summary failed")?;
    let path = out.join("installments_ltv.csv");
    report::write_csv(&segments, &path)?;
    for s in &segments {
        println!(
            "  {:<16} customers {:>7}  mean LTV {:>9.2}  median LTV {:>9.2}",
            s.install_segment, s.customers, s.avg_ltv, s.median_ltv
        );
    }
    Ok(())
}

fn run_micro_markets(insights: &OlistInsights, out: &Path) -> anyhow::Result<()> {
    let query = insights.micro_markets();
    let zips = query.zip_summary().context("zip summary failed")?;
    let threshold = candidate_threshold(&zips);
    report::write_csv(&zips, &out.join("micro_markets_zip.csv"))?;

    let candidates = select_candidates(zips);
    report::write_csv(&candidates, &out.join("micro_markets_candidates.csv"))?;
    info!(threshold, candidates = candidates.len(), "micro-market candidates");
    println!(
        "Micro-markets: {} candidate prefixes with at least {} orders",
        candidates.len(),
        threshold
    );
    Ok(())
}

fn run_freight(insights: &OlistInsights, out: &Path) -> anyhow::Result<()> {
    let states = insights.freight().by_state().context("freight summary failed")?;
    report::write_csv(&states, &out.join("freight_by_state.csv"))?;

    let above = above_average(states);
    report::write_csv(&above, &out.join("freight_above_average.csv"))?;
    for s in &above {
        println!(
            "  {}  mean freight share {:.1}%  orders {}",
            s.customer_state,
            s.mean_freight_share * 100.0,
            s.order_volume
        );
    }
    Ok(())
}

fn run_product_insights(insights: &OlistInsights, out: &Path) -> anyhow::Result<()> {
    let query = insights.product_insights();
    let top = query
        .top_categories(DEFAULT_TOP_CATEGORIES)
        .context("category sales summary failed")?;
    report::write_csv(&top, &out.join("product_top_categories.csv"))?;
    report::write_csv(
        &query.orders_by_photos().context("photo count summary failed")?,
        &out.join("product_orders_by_photos.csv"),
    )?;
    report::write_csv(
        &query
            .orders_by_description_length()
            .context("description length summary failed")?,
        &out.join("product_orders_by_description.csv"),
    )?;
    report::write_csv(
        &query.orders_by_volume().context("volume summary failed")?,
        &out.join("product_orders_by_volume.csv"),
    )?;

    for c in &top {
        println!(
            "  {:<40} items {:>7}  mean price {:>9.2}",
            c.category, c.order_count, c.avg_price
        );
    }
    Ok(())
}

fn run_sellers(insights: &OlistInsights, out: &Path) -> anyhow::Result<()> {
    let query = insights.sellers();
    let states = query.by_state().context("seller count failed")?;
    report::write_csv(&states, &out.join("sellers_by_state.csv"))?;
    report::write_csv(
        &query.customer_states().context("customer count failed")?,
        &out.join("customers_by_state.csv"),
    )?;
    report::write_csv(
        &query.pricing_by_state().context("seller pricing failed")?,
        &out.join("seller_pricing_by_state.csv"),
    )?;
    report::write_csv(
        &query
            .top_sellers(DEFAULT_TOP_SELLERS)
            .context("top sellers failed")?,
        &out.join("top_sellers.csv"),
    )?;
    report::write_csv(
        &query
            .order_volume_by_state()
            .context("seller order volume failed")?,
        &out.join("seller_orders_by_state.csv"),
    )?;
    let niches = query
        .main_categories()
        .context("seller main categories failed")?;
    report::write_csv(&niches, &out.join("seller_main_categories.csv"))?;
    report::write_csv(
        &query
            .delivery_by_state()
            .context("seller delivery times failed")?,
        &out.join("seller_delivery_by_state.csv"),
    )?;

    println!(
        "Sellers: {} states, {} main categories",
        states.len(),
        niches.len()
    );
    Ok(())
}

fn run_trends(insights: &OlistInsights, category: &str, out: &Path) -> anyhow::Result<()> {
    let rows = insights
        .trends()
        .monthly_by_state(category)
        .with_context(|| format!("monthly trend of {} failed", category))?;
    let name = format!("category_trend_{}.csv", normalize_category(category));
    report::write_csv(&rows, &out.join(name))?;
    if rows.is_empty() {
        println!("Trends: no sales found for category {}", category);
    } else {
        println!("Trends: {} state-month rows for {}", rows.len(), category);
    }
    Ok(())
}
