use std::{
    collections::BTreeMap,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    models::{
        ConvertedTrade, Currency, DailyPosition, PortfolioSummary, PortfolioValueSeries,
        PortfolioXirr, PriceSeries, Symbol, TradeSide, XirrResult,
    },
    services::Analysis,
};

#[derive(Debug, Serialize)]
pub struct PositionRow<'a> {
    symbol: &'a str,
    date: NaiveDate,
    quantity: Decimal,
    price: Decimal,
    currency: Currency,
    base_value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TradeRow<'a> {
    symbol: &'a str,
    date: NaiveDate,
    side: TradeSide,
    quantity: Decimal,
    price: Decimal,
    currency: Currency,
    fee: Decimal,
    split_factor: Decimal,
    fx_rate: Decimal,
    price_base: Decimal,
    fee_base: Decimal,
    cashflow_base: Decimal,
    approximate_rate: bool,
    source_file: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ValueRow {
    date: NaiveDate,
    value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct XirrRow<'a> {
    symbol: &'a str,
    xirr: Option<f64>,
    status: String,
    cashflows: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryRow {
    base_currency: Currency,
    current_value: Decimal,
    total_invested: Decimal,
    total_sales: Decimal,
    total_gain: Decimal,
    total_return_percent: Option<Decimal>,
    xirr: Option<f64>,
    xirr_status: String,
}

/// One row per symbol per day. `price` is the base-currency price and
/// `currency` the holding's listing currency.
pub fn write_positions<'a, W: Write>(
    writer: W,
    positions: impl IntoIterator<Item = &'a DailyPosition>,
    prices: &BTreeMap<Symbol, PriceSeries>,
    currency_of: impl Fn(&Symbol) -> Currency,
) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    for position in positions {
        let series = prices.get(position.symbol());
        for (date, quantity) in position.quantities() {
            let price = series
                .and_then(|s| s.price_on(*date))
                .unwrap_or(Decimal::ZERO);
            csv.serialize(PositionRow {
                symbol: position.symbol().as_str(),
                date: *date,
                quantity: *quantity,
                price,
                currency: currency_of(position.symbol()),
                base_value: *quantity * price,
            })?;
        }
    }

    csv.flush()?;
    Ok(())
}

pub fn write_trades<W: Write>(writer: W, trades: &[ConvertedTrade]) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    for converted in trades {
        let trade = converted.trade();
        csv.serialize(TradeRow {
            symbol: trade.symbol().as_str(),
            date: trade.date(),
            side: trade.side(),
            quantity: *trade.quantity(),
            price: *trade.price(),
            currency: *trade.currency(),
            fee: *trade.fee(),
            split_factor: *trade.split_factor(),
            fx_rate: converted.rate(),
            price_base: converted.price_base(),
            fee_base: converted.fee_base(),
            cashflow_base: converted.cashflow_base(),
            approximate_rate: converted.is_approximate(),
            source_file: trade.source_file(),
        })?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_values<W: Write>(writer: W, series: &PortfolioValueSeries) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    for (date, value) in series.totals() {
        csv.serialize(ValueRow {
            date: *date,
            value: *value,
        })?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_returns<'a, W: Write>(
    writer: W,
    results: impl IntoIterator<Item = &'a XirrResult>,
) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    for result in results {
        csv.serialize(XirrRow {
            symbol: result.symbol().as_str(),
            xirr: result.rate(),
            status: result.status(),
            cashflows: result.cashflows().len(),
        })?;
    }

    csv.flush()?;
    Ok(())
}

/// Headline totals and the whole-portfolio XIRR as a single row.
pub fn write_summary<W: Write>(
    writer: W,
    base_currency: Currency,
    summary: &PortfolioSummary,
    returns: &PortfolioXirr,
) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    csv.serialize(SummaryRow {
        base_currency,
        current_value: *summary.current_value(),
        total_invested: *summary.total_invested(),
        total_sales: *summary.total_sales(),
        total_gain: *summary.total_gain(),
        total_return_percent: *summary.total_return_percent(),
        xirr: returns.rate(),
        xirr_status: returns.status(),
    })?;

    csv.flush()?;
    Ok(())
}

/// Writes every export of a run into `dir` and returns the files written.
pub fn export_analysis(analysis: &Analysis, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let create = |name: &str| -> Result<(File, PathBuf)> {
        let path = dir.join(name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok((file, path))
    };

    let mut written = Vec::new();

    let (file, path) = create("positions.csv")?;
    write_positions(file, analysis.positions().values(), analysis.prices(), |symbol| {
        analysis
            .holding(symbol)
            .map(|h| *h.currency())
            .unwrap_or(*analysis.base_currency())
    })?;
    written.push(path);

    let (file, path) = create("trades.csv")?;
    write_trades(file, analysis.trades())?;
    written.push(path);

    let (file, path) = create("portfolio_value.csv")?;
    write_values(file, analysis.portfolio())?;
    written.push(path);

    let (file, path) = create("xirr.csv")?;
    write_returns(file, analysis.returns().values())?;
    written.push(path);

    let (file, path) = create("summary.csv")?;
    write_summary(
        file,
        *analysis.base_currency(),
        analysis.summary(),
        analysis.portfolio_returns(),
    )?;
    written.push(path);

    Ok(written)
}
