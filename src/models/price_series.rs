use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::Symbol;

/// One daily close as delivered by a price provider, in the listing currency.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, new)]
pub struct PriceBar {
    date: NaiveDate,
    close: Decimal,
}

/// Raw provider history. `split_adjusted` is set when the provider already
/// back-adjusted closes for splits.
#[derive(Clone, Debug, Default, Getters, PartialEq, new)]
pub struct PriceHistory {
    bars: Vec<PriceBar>,
    split_adjusted: bool,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PriceOrigin {
    Market,
    LastTradePrice,
    Zero,
}

/// Continuous daily base-currency prices for one symbol, split-adjusted.
#[derive(Clone, Debug, Getters, new)]
pub struct PriceSeries {
    symbol: Symbol,
    points: BTreeMap<NaiveDate, Decimal>,
    origin: PriceOrigin,
    approximate_dates: Vec<NaiveDate>,
}

impl PriceSeries {
    pub fn price_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.points.get(&date).copied()
    }

    pub fn last(&self) -> Option<(NaiveDate, Decimal)> {
        self.points.iter().next_back().map(|(d, p)| (*d, *p))
    }

    pub fn is_market(&self) -> bool {
        self.origin == PriceOrigin::Market
    }
}
