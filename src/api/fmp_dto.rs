use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{PriceBar, SplitEvent, Symbol};

#[derive(Debug, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct FmpQuoteHistoryDto {
    symbol: String,
    date: NaiveDate,
    price: Decimal,
    volume: i64,
}

impl FmpQuoteHistoryDto {
    pub fn to_price_bar(&self) -> PriceBar {
        PriceBar::new(self.date, self.price)
    }
}

#[derive(Debug, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct FmpSplitDto {
    symbol: String,
    date: NaiveDate,
    numerator: Decimal,
    denominator: Decimal,
}

impl FmpSplitDto {
    /// A zero denominator yields ratio zero, which split validation rejects.
    pub fn to_split_event(&self, symbol: &Symbol) -> SplitEvent {
        let ratio = self
            .numerator
            .checked_div(self.denominator)
            .unwrap_or(Decimal::ZERO);
        SplitEvent::new(symbol.clone(), self.date, ratio)
    }
}
