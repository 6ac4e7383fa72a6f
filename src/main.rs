use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use reqwest::Client;

use portfolio_analyzer::{
    api::{FmpApi, FrankApi},
    app::{export::export_analysis, load_ledger},
    config::AnalyzerConfig,
    services::{Analysis, Analyzer, CachingPriceProvider},
};

/// Values brokerage trade ledgers in one base currency and reports per-holding XIRR.
#[derive(Debug, Parser)]
#[command(name = "portfolio-analyzer", version, about)]
struct Cli {
    /// Broker CSV exports to consolidate
    #[arg(required = true)]
    files: Vec<String>,

    /// Overrides BASE_CURRENCY
    #[arg(long)]
    base_currency: Option<String>,

    /// Valuation date, defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Directory the ledger files are relative to
    #[arg(long)]
    data_dir: Option<String>,

    /// Write positions, trades, values and XIRR as CSV into this directory
    #[arg(long)]
    export_dir: Option<String>,

    /// Overrides MAX_CONCURRENCY
    #[arg(long)]
    max_concurrency: Option<usize>,
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn print_report(analysis: &Analysis) {
    let base = analysis.base_currency();
    let summary = analysis.summary();

    println!("Holdings as of {}", analysis.as_of());
    println!(
        "{:<12} {:>14} {:>14} {:>16}",
        "Symbol", "Quantity", "Price", "Value"
    );
    for holding in summary.holdings() {
        println!(
            "{:<12} {:>14} {:>14} {:>16}",
            holding.symbol().as_str(),
            holding.quantity().round_dp(4),
            holding.price().round_dp(2),
            holding.market_value().round_dp(2)
        );
    }

    println!();
    println!("Current value:  {} {}", summary.current_value().round_dp(2), base);
    println!("Total invested: {} {}", summary.total_invested().round_dp(2), base);
    println!("Total sales:    {} {}", summary.total_sales().round_dp(2), base);
    println!("Total P/L:      {} {}", summary.total_gain().round_dp(2), base);
    match summary.total_return_percent() {
        Some(pct) => println!("Total return:   {}%", pct.round_dp(2)),
        None => println!("Total return:   n/a"),
    }
    let portfolio_xirr = analysis.portfolio_returns();
    match portfolio_xirr.rate() {
        Some(rate) => println!("Portfolio XIRR: {:.2}%", rate * 100.0),
        None => println!("Portfolio XIRR: n/a ({})", portfolio_xirr.status()),
    }

    println!();
    println!("{:<12} {:>10} {:<20}", "Symbol", "XIRR", "Status");
    for result in analysis.returns().values() {
        let rate = result
            .rate()
            .map(|r| format!("{:.2}%", r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:>10} {:<20}",
            result.symbol().as_str(),
            rate,
            result.status()
        );
    }

    let quality = analysis.quality();
    if !quality.is_clean() {
        println!();
        println!("Data quality ({} note(s)):", quality.notes().len());
        for line in quality.lines() {
            println!("  - {}", line);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = AnalyzerConfig::from_lookup(|key| match key {
        "BASE_CURRENCY" => cli
            .base_currency
            .clone()
            .or_else(|| std::env::var(key).ok()),
        "MAX_CONCURRENCY" => cli
            .max_concurrency
            .map(|n| n.to_string())
            .or_else(|| std::env::var(key).ok()),
        _ => std::env::var(key).ok(),
    })?;

    let as_of = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let data_dir = cli.data_dir.as_deref().map(expand);

    let ledger = load_ledger(&cli.files, data_dir.as_deref());
    if ledger.is_empty() {
        log::warn!("No valid trades loaded from {} file(s)", cli.files.len());
    }

    let api_key = config.fmp_api_key().clone().unwrap_or_else(|| {
        log::warn!("FMP_API_KEY not set, prices and splits will use fallbacks");
        String::new()
    });

    let client = Client::new();
    let fmp = FmpApi::new(client.clone(), api_key);
    let analyzer = Analyzer::new(
        config,
        fmp.clone(),
        FrankApi::new(client),
        CachingPriceProvider::new(fmp),
    );

    let analysis = analyzer.run(&ledger, as_of).await;
    print_report(&analysis);

    if let Some(dir) = cli.export_dir.as_deref().map(expand) {
        let written = export_analysis(&analysis, &dir)
            .with_context(|| format!("Failed to export to {}", dir.display()))?;
        for path in written {
            log::info!("Wrote {}", path.display());
        }
    }

    Ok(())
}
