use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Serialize;

use super::Symbol;

/// A stock split taking effect on `effective_date`. A 2-for-1 split has ratio 2.
#[derive(Clone, Debug, Eq, Getters, PartialEq, Serialize, new)]
pub struct SplitEvent {
    symbol: Symbol,
    effective_date: NaiveDate,
    ratio: Decimal,
}

impl SplitEvent {
    pub fn is_valid(&self) -> bool {
        self.ratio > Decimal::ZERO
    }
}
