use rust_decimal::prelude::ToPrimitive;

use crate::{error::ComputationError, models::Cashflow};

pub const MAX_ITERATIONS: usize = 100;
pub const NPV_TOLERANCE: f64 = 1e-7;

const MIN_RATE: f64 = -0.999;
const MAX_BRACKET_RATE: f64 = 1e6;
const INITIAL_GUESS: f64 = 0.1;
const DAYS_PER_YEAR: f64 = 365.0;

/// Annualized rate r with sum(cf_i / (1 + r)^(days_i / 365)) = 0.
///
/// Newton's method from 10%, falling back to bisection over (-0.999, 1e6]
/// when a step leaves the domain or stalls. Both phases are capped at
/// [`MAX_ITERATIONS`].
pub fn xirr(cashflows: &[Cashflow]) -> Result<f64, ComputationError> {
    if cashflows.len() < 2 {
        return Err(ComputationError::InsufficientData(cashflows.len()));
    }

    let Some(first_date) = cashflows.iter().map(|cf| *cf.date()).min() else {
        return Err(ComputationError::InsufficientData(0));
    };

    let flows: Vec<(f64, f64)> = cashflows
        .iter()
        .map(|cf| {
            let years = (*cf.date() - first_date).num_days() as f64 / DAYS_PER_YEAR;
            (cf.amount().to_f64().unwrap_or_default(), years)
        })
        .collect();

    let has_inflow = flows.iter().any(|(amount, _)| *amount > 0.0);
    let has_outflow = flows.iter().any(|(amount, _)| *amount < 0.0);
    if !(has_inflow && has_outflow) {
        return Err(ComputationError::Indeterminate);
    }

    if let Some(rate) = newton(&flows) {
        return Ok(rate);
    }

    bisect(&flows)
}

fn newton(flows: &[(f64, f64)]) -> Option<f64> {
    let mut rate = INITIAL_GUESS;

    for _ in 0..MAX_ITERATIONS {
        let (npv, derivative) = npv_and_derivative(flows, rate);
        if !npv.is_finite() {
            return None;
        }
        if npv.abs() < NPV_TOLERANCE {
            return Some(rate);
        }
        if derivative == 0.0 || !derivative.is_finite() {
            return None;
        }

        let next = rate - npv / derivative;
        if !next.is_finite() || next <= MIN_RATE {
            return None;
        }
        rate = next;
    }

    None
}

fn bisect(flows: &[(f64, f64)]) -> Result<f64, ComputationError> {
    let mut low = MIN_RATE;
    let mut high = 1.0;
    let npv_low = npv_and_derivative(flows, low).0;
    let mut npv_high = npv_and_derivative(flows, high).0;

    while npv_low.signum() == npv_high.signum() && high < MAX_BRACKET_RATE {
        high *= 2.0;
        npv_high = npv_and_derivative(flows, high).0;
    }
    if npv_low.signum() == npv_high.signum() {
        return Err(ComputationError::NonConvergent(MAX_ITERATIONS));
    }

    let low_sign = npv_low.signum();
    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv = npv_and_derivative(flows, mid).0;

        if npv.abs() < NPV_TOLERANCE || (high - low) <= f64::EPSILON * high.abs().max(1.0) {
            return Ok(mid);
        }
        if npv.signum() == low_sign {
            low = mid;
        } else {
            high = mid;
        }
    }

    Err(ComputationError::NonConvergent(MAX_ITERATIONS * 2))
}

fn npv_and_derivative(flows: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let base = 1.0 + rate;

    flows
        .iter()
        .fold((0.0, 0.0), |(npv, derivative), (amount, years)| {
            let discount = base.powf(*years);
            (
                npv + amount / discount,
                derivative - years * amount / (discount * base),
            )
        })
}
