use chrono::NaiveDate;
use derive_getters::Getters;
use rust_decimal::Decimal;

use crate::{
    error::DataGapError,
    models::{Holding, SplitEvent, SplitStatus, Trade},
};

/// Sorts split events oldest first, rejecting any non-positive ratio.
pub fn validate_splits(splits: &[SplitEvent]) -> Result<Vec<SplitEvent>, DataGapError> {
    if let Some(bad) = splits.iter().find(|s| !s.is_valid()) {
        return Err(DataGapError::InvalidSplitRatio {
            symbol: bad.symbol().clone(),
            date: *bad.effective_date(),
            ratio: *bad.ratio(),
        });
    }

    let mut sorted = splits.to_vec();
    sorted.sort_by_key(|s| *s.effective_date());
    Ok(sorted)
}

/// Product of the ratios of every split that takes effect after `date`.
///
/// A trade or close dated `date` is multiplied (quantity) or divided (price)
/// by this factor to be expressed in today's share count. `None` on overflow.
pub fn cumulative_factor(splits: &[SplitEvent], date: NaiveDate) -> Option<Decimal> {
    splits
        .iter()
        .filter(|s| date < *s.effective_date())
        .try_fold(Decimal::ONE, |factor, s| factor.checked_mul(*s.ratio()))
}

/// Applies splits oldest to newest. Trades on or after a split date are
/// untouched by that split.
pub fn apply_splits(trades: &[Trade], splits: &[SplitEvent]) -> Result<Vec<Trade>, DataGapError> {
    let splits = validate_splits(splits)?;
    apply_sorted(trades, &splits)
}

fn apply_sorted(trades: &[Trade], splits: &[SplitEvent]) -> Result<Vec<Trade>, DataGapError> {
    let mut adjusted = trades.to_vec();

    for split in splits {
        for trade in adjusted.iter_mut() {
            if trade.date() < *split.effective_date() {
                *trade = trade.split_adjusted(*split.ratio()).ok_or_else(|| {
                    DataGapError::SplitOverflow {
                        symbol: split.symbol().clone(),
                        date: *split.effective_date(),
                        ratio: *split.ratio(),
                    }
                })?;
            }
        }
    }

    Ok(adjusted)
}

#[derive(Clone, Debug, Getters)]
pub struct SplitOutcome {
    holding: Holding,
    trades: Vec<Trade>,
    gap: Option<DataGapError>,
}

impl SplitOutcome {
    pub fn into_parts(self) -> (Holding, Vec<Trade>, Option<DataGapError>) {
        (self.holding, self.trades, self.gap)
    }
}

/// Adjusts one holding's trades. Missing or invalid split data leaves the
/// trades as they are and marks the holding unadjusted.
pub fn adjust_holding(
    holding: Holding,
    ledger: &[Trade],
    fetched: Result<Vec<SplitEvent>, String>,
) -> SplitOutcome {
    let trades: Vec<Trade> = holding.trades(ledger).into_iter().cloned().collect();

    let splits = match fetched {
        Ok(splits) => splits,
        Err(reason) => {
            let gap = DataGapError::SplitsUnavailable {
                symbol: holding.symbol().clone(),
                reason: reason.clone(),
            };
            return SplitOutcome {
                holding: holding.with_splits(Vec::new(), SplitStatus::Unadjusted(reason)),
                trades,
                gap: Some(gap),
            };
        }
    };

    match validate_splits(&splits).and_then(|applied| {
        apply_sorted(&trades, &applied).map(|adjusted| (applied, adjusted))
    }) {
        Ok((applied, adjusted)) => {
            if !applied.is_empty() {
                log::debug!(
                    "Applied {} split(s) to {}",
                    applied.len(),
                    holding.symbol()
                );
            }
            SplitOutcome {
                holding: holding.with_splits(applied, SplitStatus::Adjusted),
                trades: adjusted,
                gap: None,
            }
        }
        Err(gap) => SplitOutcome {
            holding: holding.with_splits(Vec::new(), SplitStatus::Unadjusted(gap.to_string())),
            trades,
            gap: Some(gap),
        },
    }
}
