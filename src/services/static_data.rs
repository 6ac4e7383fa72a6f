use std::collections::{HashMap, HashSet};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::reference_data::{PriceProvider, RateProvider, SplitProvider};
use crate::models::{Currency, PriceBar, PriceHistory, RateHistory, SplitEvent, Symbol};

/// In-memory reference data. Keys registered with `fail_*` return an error
/// instead of data, every other unknown key returns an empty result.
#[derive(Clone, Debug, Default)]
pub struct StaticReferenceData {
    splits: HashMap<Symbol, Vec<SplitEvent>>,
    rates: HashMap<Currency, RateHistory>,
    prices: HashMap<Symbol, PriceHistory>,
    failing_splits: HashSet<Symbol>,
    failing_rates: HashSet<Currency>,
    failing_prices: HashSet<Symbol>,
}

impl StaticReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split(mut self, split: SplitEvent) -> Self {
        self.splits
            .entry(split.symbol().clone())
            .or_default()
            .push(split);
        self
    }

    pub fn with_rate(mut self, currency: Currency, date: NaiveDate, rate: Decimal) -> Self {
        self.rates.entry(currency).or_default().insert(date, rate);
        self
    }

    pub fn with_close(mut self, symbol: &Symbol, date: NaiveDate, close: Decimal) -> Self {
        let history = self.prices.remove(symbol).unwrap_or_default();
        let mut bars = history.bars().clone();
        bars.push(PriceBar::new(date, close));
        self.prices.insert(
            symbol.clone(),
            PriceHistory::new(bars, *history.split_adjusted()),
        );
        self
    }

    /// Replaces the whole history of `symbol`.
    pub fn with_history(mut self, symbol: &Symbol, history: PriceHistory) -> Self {
        self.prices.insert(symbol.clone(), history);
        self
    }

    pub fn fail_splits(mut self, symbol: &Symbol) -> Self {
        self.failing_splits.insert(symbol.clone());
        self
    }

    pub fn fail_rates(mut self, currency: Currency) -> Self {
        self.failing_rates.insert(currency);
        self
    }

    pub fn fail_prices(mut self, symbol: &Symbol) -> Self {
        self.failing_prices.insert(symbol.clone());
        self
    }
}

#[async_trait]
impl SplitProvider for StaticReferenceData {
    async fn splits(&self, symbol: &Symbol, _currency: Currency) -> Result<Vec<SplitEvent>> {
        if self.failing_splits.contains(symbol) {
            bail!("split source unavailable for {}", symbol);
        }
        Ok(self.splits.get(symbol).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl RateProvider for StaticReferenceData {
    async fn rates(
        &self,
        currency: Currency,
        _base: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateHistory> {
        if self.failing_rates.contains(&currency) {
            bail!("rate source unavailable for {}", currency);
        }
        if start > end {
            return Ok(RateHistory::new());
        }
        Ok(self
            .rates
            .get(&currency)
            .map(|history| {
                history
                    .range(start..=end)
                    .map(|(d, r)| (*d, *r))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl PriceProvider for StaticReferenceData {
    async fn history(
        &self,
        symbol: &Symbol,
        _currency: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory> {
        if self.failing_prices.contains(symbol) {
            bail!("price source unavailable for {}", symbol);
        }
        let Some(history) = self.prices.get(symbol) else {
            return Ok(PriceHistory::default());
        };
        let bars = history
            .bars()
            .iter()
            .filter(|bar| *bar.date() >= start && *bar.date() <= end)
            .cloned()
            .collect();
        Ok(PriceHistory::new(bars, *history.split_adjusted()))
    }
}
