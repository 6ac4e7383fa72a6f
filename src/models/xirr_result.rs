use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

use super::Symbol;
use crate::error::ComputationError;

#[derive(Clone, Copy, Debug, Getters, PartialEq, new)]
pub struct Cashflow {
    date: NaiveDate,
    amount: Decimal,
}

/// Annualized return of one holding, or the reason it could not be solved.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct XirrResult {
    symbol: Symbol,
    cashflows: Vec<Cashflow>,
    outcome: Result<f64, ComputationError>,
}

impl XirrResult {
    pub fn rate(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }

    pub fn is_solved(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn status(&self) -> String {
        status_of(&self.outcome)
    }
}

/// Annualized return of every trade pooled, marked to the total portfolio value.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct PortfolioXirr {
    cashflows: Vec<Cashflow>,
    outcome: Result<f64, ComputationError>,
}

impl PortfolioXirr {
    pub fn rate(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }

    pub fn status(&self) -> String {
        status_of(&self.outcome)
    }
}

fn status_of(outcome: &Result<f64, ComputationError>) -> String {
    match outcome {
        Ok(_) => String::from("ok"),
        Err(ComputationError::InsufficientData(_)) => String::from("insufficient data"),
        Err(ComputationError::Indeterminate) => String::from("indeterminate"),
        Err(ComputationError::NonConvergent(_)) => String::from("non-convergent"),
    }
}
