use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    app::calc::xirr,
    models::{
        Cashflow, ConvertedTrade, PortfolioValueSeries, PortfolioXirr, PriceSeries, Symbol,
        XirrResult,
    },
};

const OPEN_POSITION_EPSILON: Decimal = dec!(0.000001);

/// Buys are money out, sells are money in, both net of fees in base currency.
pub fn trade_cashflows(trades: &[ConvertedTrade], as_of: NaiveDate) -> Vec<Cashflow> {
    trades
        .iter()
        .filter(|t| t.trade().date() <= as_of)
        .map(|t| Cashflow::new(t.trade().date(), t.cashflow_base()))
        .collect()
}

/// Terminal value of a still-open position at the market price on `as_of`.
///
/// Closed positions and holdings without a market price get no mark-to-market.
pub fn mark_to_market(
    trades: &[ConvertedTrade],
    prices: Option<&PriceSeries>,
    as_of: NaiveDate,
) -> Option<Cashflow> {
    let held: Decimal = trades
        .iter()
        .filter(|t| t.trade().date() <= as_of)
        .map(|t| *t.trade().quantity())
        .sum();

    if held.abs() <= OPEN_POSITION_EPSILON {
        return None;
    }

    let series = prices.filter(|s| s.is_market())?;
    let price = series
        .price_on(as_of)
        .or_else(|| series.last().map(|(_, p)| p))?;

    Some(Cashflow::new(as_of, held * price))
}

/// Builds one holding's cashflow timeline and solves its XIRR.
pub fn compute_returns(
    symbol: &Symbol,
    trades: &[ConvertedTrade],
    prices: Option<&PriceSeries>,
    as_of: NaiveDate,
) -> XirrResult {
    let mut cashflows = trade_cashflows(trades, as_of);

    match mark_to_market(trades, prices, as_of) {
        Some(markout) => cashflows.push(markout),
        None => log::debug!("No mark-to-market cashflow for {}", symbol),
    }

    cashflows.sort_by_key(|cf| *cf.date());

    let outcome = xirr(&cashflows);
    XirrResult::new(symbol.clone(), cashflows, outcome)
}

/// Pools the cashflows of every trade and closes them with the portfolio
/// value on `as_of` (or the last valued day before it).
pub fn compute_portfolio_returns(
    trades: &[ConvertedTrade],
    portfolio: &PortfolioValueSeries,
    as_of: NaiveDate,
) -> PortfolioXirr {
    let mut cashflows = trade_cashflows(trades, as_of);

    let terminal = portfolio.totals().range(..=as_of).next_back();
    match terminal.map(|(_, value)| *value) {
        Some(value) if value > Decimal::ZERO => cashflows.push(Cashflow::new(as_of, value)),
        _ => log::debug!("No terminal portfolio value on {}", as_of),
    }

    cashflows.sort_by_key(|cf| *cf.date());

    let outcome = xirr(&cashflows);
    PortfolioXirr::new(cashflows, outcome)
}
