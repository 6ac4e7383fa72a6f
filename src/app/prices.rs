use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_new::new;
use rust_decimal::Decimal;

use crate::{
    app::{fx::CurrencyConverter, splits::cumulative_factor, utils::calendar_days},
    config::{FallbackPolicy, MissingPricePolicy},
    models::{Holding, PriceHistory, PriceOrigin, PriceSeries, Trade},
};

/// Builds continuous daily base-currency price series over `start..=end`.
#[derive(new)]
pub struct PriceResolver<'a> {
    converter: &'a CurrencyConverter,
    fallback: &'a FallbackPolicy,
    start: NaiveDate,
    end: NaiveDate,
}

impl PriceResolver<'_> {
    /// `trades` are the holding's split-adjusted trades, used only when the
    /// provider returned nothing and the policy values at last trade price.
    pub fn resolve(&self, holding: &Holding, history: &PriceHistory, trades: &[Trade]) -> PriceSeries {
        let observed = self.observed_closes(holding, history);

        let (observed, origin) = if !observed.is_empty() {
            (observed, PriceOrigin::Market)
        } else {
            match self.fallback.missing_price() {
                MissingPricePolicy::LastTradePrice => {
                    let from_trades = self.trade_prices(trades);
                    if from_trades.is_empty() {
                        (from_trades, PriceOrigin::Zero)
                    } else {
                        (from_trades, PriceOrigin::LastTradePrice)
                    }
                }
                MissingPricePolicy::Zero => (BTreeMap::new(), PriceOrigin::Zero),
            }
        };

        let filled = fill_calendar(&observed, self.start, self.end);

        let mut points = BTreeMap::new();
        let mut approximate_dates = Vec::new();

        for (date, native) in filled {
            let (price, applied) = self.converter.convert(native, *holding.currency(), date);
            if applied.is_approximate() {
                approximate_dates.push(date);
            }
            points.insert(date, price);
        }

        PriceSeries::new(holding.symbol().clone(), points, origin, approximate_dates)
    }

    /// Positive closes inside the window, divided by the split factor of their date.
    fn observed_closes(&self, holding: &Holding, history: &PriceHistory) -> BTreeMap<NaiveDate, Decimal> {
        history
            .bars()
            .iter()
            .filter(|bar| *bar.date() >= self.start && *bar.date() <= self.end)
            .filter(|bar| *bar.close() > Decimal::ZERO)
            .filter_map(|bar| {
                let close = if *history.split_adjusted() {
                    *bar.close()
                } else {
                    let factor = cumulative_factor(holding.splits(), *bar.date())?;
                    bar.close().checked_div(factor)?
                };
                Some((*bar.date(), close))
            })
            .collect()
    }

    fn trade_prices(&self, trades: &[Trade]) -> BTreeMap<NaiveDate, Decimal> {
        trades
            .iter()
            .filter(|t| t.date() <= self.end && *t.price() > Decimal::ZERO)
            .map(|t| (t.date().max(self.start), *t.price()))
            .collect()
    }
}

/// Forward-fills every calendar day of the window from the observations, then
/// back-fills the leading gap from the first observation. An empty input
/// yields zero for every day.
pub fn fill_calendar(
    observed: &BTreeMap<NaiveDate, Decimal>,
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<NaiveDate, Decimal> {
    let first_known = observed.values().next().copied().unwrap_or(Decimal::ZERO);
    let mut last = None;

    calendar_days(start, end)
        .map(|date| {
            if let Some(price) = observed.get(&date) {
                last = Some(*price);
            }
            (date, last.unwrap_or(first_known))
        })
        .collect()
}
