use std::{
    collections::HashMap,
    ops::Bound::{Excluded, Unbounded},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    config::FallbackPolicy,
    models::{AppliedRate, ConvertedTrade, Currency, RateHistory, RateSource, Trade},
};

/// Converts amounts into the base currency from a fixed snapshot of rates.
///
/// Lookup order for a (currency, date):
/// 1. the rate recorded on that date;
/// 2. the latest rate strictly before it;
/// 3. the earliest rate strictly after it, when nothing earlier exists;
/// 4. the configured fallback constant, flagged approximate.
///
/// Rates are never interpolated. The same lookup serves trades and price
/// history so valuations and returns agree.
#[derive(Clone, Debug)]
pub struct CurrencyConverter {
    base: Currency,
    rates: HashMap<Currency, RateHistory>,
    fallback: FallbackPolicy,
}

impl CurrencyConverter {
    pub fn new(
        base: Currency,
        rates: HashMap<Currency, RateHistory>,
        fallback: FallbackPolicy,
    ) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(currency, _)| *currency != base)
            .map(|(currency, history)| {
                let before = history.len();
                let usable: RateHistory = history
                    .into_iter()
                    .filter(|(_, rate)| *rate > Decimal::ZERO)
                    .collect();
                if usable.len() < before {
                    log::warn!(
                        "Dropped {} non-positive {} rate(s)",
                        before - usable.len(),
                        currency
                    );
                }
                (currency, usable)
            })
            .filter(|(_, history)| !history.is_empty())
            .collect();

        Self {
            base,
            rates,
            fallback,
        }
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    pub fn has_rates(&self, currency: Currency) -> bool {
        currency == self.base || self.rates.contains_key(&currency)
    }

    pub fn rate(&self, currency: Currency, date: NaiveDate) -> AppliedRate {
        if currency == self.base {
            return AppliedRate::new(Decimal::ONE, RateSource::Identity);
        }

        if let Some(history) = self.rates.get(&currency) {
            if let Some(rate) = history.get(&date) {
                return AppliedRate::new(*rate, RateSource::Exact);
            }
            if let Some((d, rate)) = history.range(..date).next_back() {
                return AppliedRate::new(*rate, RateSource::Prior(*d));
            }
            if let Some((d, rate)) = history.range((Excluded(date), Unbounded)).next() {
                return AppliedRate::new(*rate, RateSource::Following(*d));
            }
        }

        AppliedRate::new(self.fallback.rate_for(currency), RateSource::Fallback)
    }

    pub fn convert(
        &self,
        amount: Decimal,
        currency: Currency,
        date: NaiveDate,
    ) -> (Decimal, AppliedRate) {
        let applied = self.rate(currency, date);
        (amount * *applied.rate(), applied)
    }

    /// Inverse of [`convert`](Self::convert) using the same date's rate.
    pub fn convert_from_base(&self, amount: Decimal, currency: Currency, date: NaiveDate) -> Decimal {
        let rate = *self.rate(currency, date).rate();
        amount.checked_div(rate).unwrap_or(Decimal::ZERO)
    }

    pub fn convert_trade(&self, trade: Trade) -> ConvertedTrade {
        let applied = self.rate(*trade.currency(), trade.date());
        ConvertedTrade::new(trade, applied)
    }
}
