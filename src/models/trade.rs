use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Serialize;
use strum_macros::Display;

use super::{AppliedRate, Currency, Symbol};

/// One executed order. Positive quantity buys, negative quantity sells.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct Trade {
    symbol: Symbol,
    timestamp: NaiveDateTime,
    quantity: Decimal,
    price: Decimal,
    currency: Currency,
    fee: Decimal,
    source_file: String,
    #[new(value = "Decimal::ONE")]
    split_factor: Decimal,
}

impl Trade {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn side(&self) -> TradeSide {
        if self.quantity > Decimal::ZERO {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        }
    }

    /// Cash paid (negative) or received (positive) in the trade currency, fees included.
    pub fn cashflow(&self) -> Decimal {
        -(self.quantity * self.price) - self.fee
    }

    /// Derived copy with quantity multiplied and price divided by `factor`.
    /// `None` when the adjusted values no longer fit a `Decimal`.
    pub fn split_adjusted(&self, factor: Decimal) -> Option<Trade> {
        if factor == Decimal::ONE {
            return Some(self.clone());
        }

        Some(Trade {
            quantity: self.quantity.checked_mul(factor)?,
            price: self.price.checked_div(factor)?,
            split_factor: self.split_factor.checked_mul(factor)?,
            ..self.clone()
        })
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A split-adjusted trade together with the rate that maps it into the base currency.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct ConvertedTrade {
    trade: Trade,
    applied_rate: AppliedRate,
}

impl ConvertedTrade {
    pub fn rate(&self) -> Decimal {
        *self.applied_rate.rate()
    }

    pub fn price_base(&self) -> Decimal {
        self.trade.price * self.rate()
    }

    pub fn fee_base(&self) -> Decimal {
        self.trade.fee * self.rate()
    }

    pub fn cashflow_base(&self) -> Decimal {
        self.trade.cashflow() * self.rate()
    }

    pub fn is_approximate(&self) -> bool {
        self.applied_rate.is_approximate()
    }
}
