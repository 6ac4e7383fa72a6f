//! Error taxonomy of the analyzer.
//!
//! Only [`FatalConfigError`] stops a run. Every other family degrades to a
//! fallback or a per-item skip and ends up in the quality report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Currency, Symbol};

/// Missing or unusable reference data. Always recovered by a fallback.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DataGapError {
    #[error("no exchange rates for {currency}: {reason}")]
    RatesUnavailable { currency: Currency, reason: String },

    #[error("{symbol} converted from {currency} at fallback rate {rate} on {days} day(s) from {first}")]
    FallbackRate {
        symbol: Symbol,
        currency: Currency,
        rate: Decimal,
        first: NaiveDate,
        days: usize,
    },

    #[error("no split data for {symbol}: {reason}")]
    SplitsUnavailable { symbol: Symbol, reason: String },

    #[error("invalid split ratio {ratio} for {symbol} on {date}")]
    InvalidSplitRatio {
        symbol: Symbol,
        date: NaiveDate,
        ratio: Decimal,
    },

    #[error("split of {symbol} on {date} by {ratio} overflows the adjusted trades")]
    SplitOverflow {
        symbol: Symbol,
        date: NaiveDate,
        ratio: Decimal,
    },

    #[error("no price history for {symbol}: {reason}")]
    PricesUnavailable { symbol: Symbol, reason: String },

    #[error("{symbol} oversold on {count} day(s) starting {first}")]
    ShortPosition {
        symbol: Symbol,
        first: NaiveDate,
        count: usize,
    },

    #[error("ledger file {file} skipped: {reason}")]
    LedgerFileSkipped { file: String, reason: String },
}

/// A trade record that cannot enter the ledger.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvalidRecordError {
    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("field '{field}' is not numeric: '{value}'")]
    NotNumeric { field: String, value: String },

    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),

    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),

    #[error("quantity is zero")]
    ZeroQuantity,

    #[error("negative price {0}")]
    NegativePrice(Decimal),

    #[error("quantity {quantity} at price {price} with fee {fee} is out of range")]
    OutOfRange {
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
    },

    #[error("{symbol} already traded in {expected}, record is in {found}")]
    CurrencyMismatch {
        symbol: Symbol,
        expected: Currency,
        found: Currency,
    },
}

/// Per-holding return computation failure.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ComputationError {
    #[error("insufficient data: {0} cashflow(s)")]
    InsufficientData(usize),

    #[error("indeterminate: cashflows never change sign")]
    Indeterminate,

    #[error("non-convergent after {0} iterations")]
    NonConvergent(usize),
}

/// Unusable configuration. Halts the run before any computation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FatalConfigError {
    #[error("no base currency configured (set BASE_CURRENCY)")]
    MissingBaseCurrency,

    #[error("unknown base currency '{0}'")]
    UnknownBaseCurrency(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}
