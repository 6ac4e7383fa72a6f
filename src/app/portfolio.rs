use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    ConvertedTrade, CurrentHolding, DailyPosition, PortfolioSummary, PortfolioValueSeries,
    PriceSeries, Symbol,
};

const MIN_REPORTED_QUANTITY: Decimal = dec!(0.001);

/// Sums position x price per day across symbols.
///
/// The result spans the union of every symbol's dates; a symbol missing a
/// quantity or a price on some day contributes zero to that day.
pub fn value_portfolio(
    positions: &[DailyPosition],
    prices: &BTreeMap<Symbol, PriceSeries>,
) -> PortfolioValueSeries {
    let by_symbol: BTreeMap<&Symbol, &DailyPosition> =
        positions.iter().map(|p| (p.symbol(), p)).collect();

    let symbols: BTreeSet<&Symbol> = by_symbol.keys().copied().chain(prices.keys()).collect();

    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut contributions = BTreeMap::new();

    for symbol in symbols {
        let position = by_symbol.get(symbol);
        let series = prices.get(symbol);

        let dates: BTreeSet<NaiveDate> = position
            .map(|p| p.quantities().keys().copied().collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
            .chain(
                series
                    .map(|s| s.points().keys().copied().collect::<Vec<_>>())
                    .unwrap_or_default(),
            )
            .collect();

        let mut values = BTreeMap::new();
        for date in dates {
            let quantity = position
                .and_then(|p| p.quantity_on(date))
                .unwrap_or(Decimal::ZERO);
            let price = series
                .and_then(|s| s.price_on(date))
                .unwrap_or(Decimal::ZERO);
            let value = quantity * price;

            *totals.entry(date).or_insert(Decimal::ZERO) += value;
            values.insert(date, value);
        }

        contributions.insert(symbol.clone(), values);
    }

    PortfolioValueSeries::new(totals, contributions)
}

/// Open holdings at the end of the series and headline totals.
pub fn summarize(
    portfolio: &PortfolioValueSeries,
    positions: &[DailyPosition],
    prices: &BTreeMap<Symbol, PriceSeries>,
    trades: &[ConvertedTrade],
) -> PortfolioSummary {
    let mut holdings: Vec<CurrentHolding> = positions
        .iter()
        .filter_map(|position| {
            let (date, quantity) = position.last()?;
            if quantity.abs() <= MIN_REPORTED_QUANTITY {
                return None;
            }
            let price = prices
                .get(position.symbol())
                .and_then(|s| s.price_on(date).or_else(|| s.last().map(|(_, p)| p)))
                .unwrap_or(Decimal::ZERO);
            Some(CurrentHolding::new(
                position.symbol().clone(),
                quantity,
                price,
                quantity * price,
            ))
        })
        .collect();

    holdings.sort_by(|a, b| b.market_value().cmp(a.market_value()));

    let current_value = portfolio.last().map(|(_, v)| v).unwrap_or(Decimal::ZERO);

    let total_invested: Decimal = trades
        .iter()
        .map(ConvertedTrade::cashflow_base)
        .filter(|cf| *cf < Decimal::ZERO)
        .map(|cf| cf.abs())
        .sum();

    let total_sales: Decimal = trades
        .iter()
        .map(ConvertedTrade::cashflow_base)
        .filter(|cf| *cf > Decimal::ZERO)
        .sum();

    let total_gain = current_value + total_sales - total_invested;
    let total_return_percent = if total_invested > Decimal::ZERO {
        Some(total_gain / total_invested * Decimal::ONE_HUNDRED)
    } else {
        None
    };

    PortfolioSummary::new(
        holdings,
        current_value,
        total_invested,
        total_sales,
        total_gain,
        total_return_percent,
    )
}
