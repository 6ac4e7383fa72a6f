use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

use super::Symbol;

/// Aggregate base-currency value per day, with each symbol's contribution.
#[derive(Clone, Debug, Default, Getters, new)]
pub struct PortfolioValueSeries {
    totals: BTreeMap<NaiveDate, Decimal>,
    contributions: BTreeMap<Symbol, BTreeMap<NaiveDate, Decimal>>,
}

impl PortfolioValueSeries {
    pub fn value_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.totals.get(&date).copied()
    }

    pub fn last(&self) -> Option<(NaiveDate, Decimal)> {
        self.totals.iter().next_back().map(|(d, v)| (*d, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
