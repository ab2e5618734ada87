//! Levelwatch report
//!
//! Fetches the daily history for the configured instrument, runs the level
//! pipeline once and prints the result. `--json` prints the report as JSON;
//! `--price <value>` skips the live price lookup.

use clap::Parser;
use dotenvy::dotenv;
use levelwatch::config::Config;
use levelwatch::levels::LevelEngine;
use levelwatch::logging;
use levelwatch::models::LevelReport;
use levelwatch::services::hyperliquid::HyperliquidMarketDataProvider;
use levelwatch::services::{BarSeriesCache, MarketDataProvider};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "level-report",
    about = "Support and resistance levels for one Hyperliquid instrument"
)]
struct Cli {
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Use this price instead of the live mid price.
    #[arg(long)]
    price: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    info!(
        environment = %levelwatch::config::get_environment(),
        symbol = %config.symbol,
        predefined = config.predefined_levels.len(),
        mode = ?config.detection_mode,
        "Starting level report for {}",
        config.symbol
    );

    let provider: Arc<dyn MarketDataProvider + Send + Sync> =
        Arc::new(HyperliquidMarketDataProvider::from_config(&config)?);
    let cache = Arc::new(BarSeriesCache::new(provider.clone(), config.symbol.clone()));
    let engine = LevelEngine::new(cache, provider, config);

    let price = match cli.price {
        Some(price) => price,
        None => engine.current_price().await?,
    };
    let report = engine.run(price).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &LevelReport) {
    println!("{} @ {:.2}", report.symbol, report.price);
    if report.stale {
        println!("  (history is stale: last refresh failed)");
    }
    if report.insufficient_data {
        println!("  No levels detected: only {} bars of history", report.bar_count);
        return;
    }

    match (report.support, report.support_distance_pct()) {
        (Some(level), Some(pct)) => println!("  Support:    {:.2} ({:.2}% below)", level, pct),
        _ => println!("  Support:    none in range"),
    }
    match (report.resistance, report.resistance_distance_pct()) {
        (Some(level), Some(pct)) => println!("  Resistance: {:.2} ({:.2}% above)", level, pct),
        _ => println!("  Resistance: none in range"),
    }

    println!("  Detected levels ({}):", report.levels.len());
    for level in &report.levels {
        println!("    {:.2}", level);
    }

    if !report.validated.is_empty() {
        println!("  Validated predefined levels:");
        for v in &report.validated {
            println!(
                "    {:.2} (touches: {}, reversals: {})",
                v.level, v.touches, v.reversals
            );
        }
    }
    println!("  Prominence threshold: {:.2}%", report.prominence * 100.0);
    println!("  Similarity: {:.1}%", report.similarity);
}
