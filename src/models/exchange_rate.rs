use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

/// Sparse date-indexed rates: base-currency units per one unit of the foreign currency.
pub type RateHistory = BTreeMap<NaiveDate, Decimal>;

/// Where a rate used for a conversion came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RateSource {
    Identity,
    Exact,
    Prior(NaiveDate),
    Following(NaiveDate),
    Fallback,
}

#[derive(Clone, Copy, Debug, Getters, PartialEq, new)]
pub struct AppliedRate {
    rate: Decimal,
    source: RateSource,
}

impl AppliedRate {
    pub fn is_approximate(&self) -> bool {
        self.source == RateSource::Fallback
    }
}
