use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{Currency, RateHistory};

/// Response of the Frankfurter time series endpoint `/{start}..{end}`.
#[derive(Debug, Deserialize, Getters, new)]
pub struct FrankTimeSeriesDto {
    amount: Decimal,
    base: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rates: BTreeMap<NaiveDate, HashMap<String, Decimal>>,
}

impl FrankTimeSeriesDto {
    /// Rates quoted in `to` per one unit of the request's base, normalized by `amount`.
    pub fn to_rate_history(&self, to: Currency) -> RateHistory {
        let code = to.to_string();

        self.rates
            .iter()
            .filter_map(|(date, quotes)| {
                let quote = quotes.get(&code)?;
                let rate = quote.checked_div(self.amount)?;
                Some((*date, rate))
            })
            .collect()
    }
}
