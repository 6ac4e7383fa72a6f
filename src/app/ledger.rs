use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    app::utils::{parse_datetime, parse_decimal},
    error::{DataGapError, InvalidRecordError},
    models::{Currency, RejectedRecord, Symbol, Trade},
};

const COL_HEADER: &str = "Header";
const COL_SYMBOL: &str = "Symbol";
const COL_CURRENCY: &str = "Currency";
const COL_DATE: &str = "Date/Time";
const COL_QUANTITY: &str = "Quantity";
const COL_PRICE: &str = "T. Price";
const COL_FEE: &str = "Comm/Fee";

/// Largest quantity, price, fee or notional a ledger row may carry. Leaves
/// headroom for split factors, exchange rates and portfolio totals.
const MAX_AMOUNT: Decimal = dec!(1_000_000_000_000_000);

/// A ledger row exactly as read from a broker export.
#[derive(Clone, Debug, Getters, new)]
pub struct RawTrade {
    source_file: String,
    row: usize,
    symbol: String,
    timestamp: String,
    quantity: String,
    price: String,
    currency: String,
    fee: String,
}

/// Consolidated, validated and chronologically ordered trades.
#[derive(Clone, Debug, Default, Getters)]
pub struct Ledger {
    trades: Vec<Trade>,
    rejected: Vec<RejectedRecord>,
    skipped_files: Vec<DataGapError>,
}

impl Ledger {
    pub fn from_trades(mut trades: Vec<Trade>) -> Ledger {
        trades.sort_by_key(|t| *t.timestamp());
        Ledger {
            trades,
            ..Ledger::default()
        }
    }

    /// Validates raw rows into trades. Invalid rows are kept aside, never fatal.
    pub fn normalize(raw_trades: Vec<RawTrade>) -> Ledger {
        let mut trades = Vec::with_capacity(raw_trades.len());
        let mut rejected = Vec::new();

        for raw in &raw_trades {
            match normalize_record(raw) {
                Ok(trade) => trades.push((*raw.row(), trade)),
                Err(err) => {
                    log::warn!(
                        "Skipping row {} of {}: {}",
                        raw.row(),
                        raw.source_file(),
                        err
                    );
                    rejected.push(RejectedRecord::new(
                        raw.source_file().clone(),
                        *raw.row(),
                        err,
                    ));
                }
            }
        }

        trades.sort_by_key(|(_, t)| *t.timestamp());

        let mut currencies: HashMap<Symbol, Currency> = HashMap::new();
        let mut consistent = Vec::with_capacity(trades.len());

        for (row, trade) in trades {
            let expected = *currencies
                .entry(trade.symbol().clone())
                .or_insert(*trade.currency());

            if expected != *trade.currency() {
                let err = InvalidRecordError::CurrencyMismatch {
                    symbol: trade.symbol().clone(),
                    expected,
                    found: *trade.currency(),
                };
                log::warn!("Skipping trade from {}: {}", trade.source_file(), err);
                rejected.push(RejectedRecord::new(trade.source_file().clone(), row, err));
                continue;
            }
            consistent.push(trade);
        }

        Ledger {
            trades: consistent,
            rejected,
            skipped_files: Vec::new(),
        }
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.trades.first().map(Trade::date)
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

fn normalize_record(raw: &RawTrade) -> Result<Trade, InvalidRecordError> {
    let symbol = Symbol::parse(raw.symbol())?;
    let currency = Currency::parse_code(raw.currency())
        .ok_or_else(|| InvalidRecordError::UnknownCurrency(raw.currency().clone()))?;
    let timestamp = parse_datetime(raw.timestamp())?;

    let quantity = parse_decimal(raw.quantity(), COL_QUANTITY)?;
    if quantity.is_zero() {
        return Err(InvalidRecordError::ZeroQuantity);
    }

    let price = parse_decimal(raw.price(), COL_PRICE)?;
    if price < Decimal::ZERO {
        return Err(InvalidRecordError::NegativePrice(price));
    }

    // Brokers report commissions as negative amounts; the ledger keeps the cost.
    let fee = if raw.fee().trim().is_empty() {
        Decimal::ZERO
    } else {
        parse_decimal(raw.fee(), COL_FEE)?.abs()
    };

    let notional = quantity.checked_mul(price);
    let in_range = quantity.abs() <= MAX_AMOUNT
        && price <= MAX_AMOUNT
        && fee <= MAX_AMOUNT
        && notional.is_some_and(|n| n.abs() <= MAX_AMOUNT);
    if !in_range {
        return Err(InvalidRecordError::OutOfRange {
            quantity,
            price,
            fee,
        });
    }

    Ok(Trade::new(
        symbol,
        timestamp,
        quantity,
        price,
        currency,
        fee,
        raw.source_file().clone(),
    ))
}

/// Reads and consolidates several broker exports. Unreadable files are skipped.
pub fn load_ledger(files: &[String], data_dir: Option<&Path>) -> Ledger {
    let mut raw_trades = Vec::new();
    let mut skipped_files = Vec::new();

    for file in files {
        let path = match data_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        };

        match read_ledger_file(&path, file) {
            Ok(mut rows) => {
                log::info!("Loaded {} trade rows from {}", rows.len(), file);
                raw_trades.append(&mut rows);
            }
            Err(err) => {
                let gap = DataGapError::LedgerFileSkipped {
                    file: file.clone(),
                    reason: format!("{:#}", err),
                };
                log::warn!("{}", gap);
                skipped_files.push(gap);
            }
        }
    }

    let mut ledger = Ledger::normalize(raw_trades);
    ledger.skipped_files = skipped_files;
    ledger
}

pub fn read_ledger_file(path: &Path, source_file: &str) -> Result<Vec<RawTrade>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file at path: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header of {}", path.display()))?
        .clone();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Missing column '{}' in {}", name, path.display()))
    };

    let header_col = headers.iter().position(|h| h == COL_HEADER);
    let symbol_col = column(COL_SYMBOL)?;
    let currency_col = column(COL_CURRENCY)?;
    let date_col = column(COL_DATE)?;
    let quantity_col = column(COL_QUANTITY)?;
    let price_col = column(COL_PRICE)?;
    let fee_col = headers.iter().position(|h| h == COL_FEE);

    let mut rows = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                log::warn!(
                    "Skipping malformed line at row {} of {}: {}",
                    row_idx + 1,
                    source_file,
                    err
                );
                continue;
            }
        };

        if let Some(col) = header_col {
            if field(&record, Some(col)) != "Data" {
                continue;
            }
        }

        rows.push(RawTrade::new(
            source_file.to_string(),
            row_idx + 1,
            field(&record, Some(symbol_col)),
            field(&record, Some(date_col)),
            field(&record, Some(quantity_col)),
            field(&record, Some(price_col)),
            field(&record, Some(currency_col)),
            field(&record, fee_col),
        ));
    }

    Ok(rows)
}

fn field(record: &StringRecord, column: Option<usize>) -> String {
    column
        .and_then(|c| record.get(c))
        .unwrap_or_default()
        .to_string()
}
