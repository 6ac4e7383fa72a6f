#![cfg(test)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    config::AnalyzerConfig,
    models::{Currency, Symbol, Trade},
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).unwrap()
}

pub fn trade(
    raw_symbol: &str,
    on: NaiveDate,
    quantity: Decimal,
    price: Decimal,
    currency: Currency,
) -> Trade {
    Trade::new(
        symbol(raw_symbol),
        on.and_hms_opt(10, 0, 0).unwrap(),
        quantity,
        price,
        currency,
        Decimal::ZERO,
        "trades.csv".to_string(),
    )
}

/// USD base without retry delays.
pub fn usd_config() -> AnalyzerConfig {
    AnalyzerConfig::new(Currency::Usd).with_fetch_retries(0, 0)
}
