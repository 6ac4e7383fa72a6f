use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

use super::Symbol;

/// Net split-adjusted quantity held on every calendar day of a range.
#[derive(Clone, Debug, Getters, new)]
pub struct DailyPosition {
    symbol: Symbol,
    quantities: BTreeMap<NaiveDate, Decimal>,
    short_dates: Vec<NaiveDate>,
}

impl DailyPosition {
    pub fn quantity_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.quantities.get(&date).copied()
    }

    pub fn last(&self) -> Option<(NaiveDate, Decimal)> {
        self.quantities.iter().next_back().map(|(d, q)| (*d, *q))
    }
}
