use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    app::utils::calendar_days,
    config::ShortPositionPolicy,
    models::{DailyPosition, Symbol, Trade},
};

/// Step-function quantity series from the first trade date through `end`.
///
/// Quantity on day D is the sum of all signed quantities traded on or before D.
/// Overselling is never rejected here: under [`ShortPositionPolicy::Flag`] the
/// negative days are listed on the result for the caller to act on.
pub fn track_positions(
    symbol: &Symbol,
    trades: &[Trade],
    end: NaiveDate,
    policy: ShortPositionPolicy,
) -> DailyPosition {
    let mut deltas: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for trade in trades {
        if trade.date() > end {
            log::debug!(
                "Ignoring {} trade dated {} after valuation end {}",
                symbol,
                trade.date(),
                end
            );
            continue;
        }
        *deltas.entry(trade.date()).or_insert(Decimal::ZERO) += *trade.quantity();
    }

    let Some(first) = deltas.keys().next().copied() else {
        return DailyPosition::new(symbol.clone(), BTreeMap::new(), Vec::new());
    };

    let mut quantities = BTreeMap::new();
    let mut short_dates = Vec::new();
    let mut held = Decimal::ZERO;

    for date in calendar_days(first, end) {
        if let Some(delta) = deltas.get(&date) {
            held += *delta;
        }
        if held < Decimal::ZERO && policy == ShortPositionPolicy::Flag {
            short_dates.push(date);
        }
        quantities.insert(date, held);
    }

    DailyPosition::new(symbol.clone(), quantities, short_dates)
}
