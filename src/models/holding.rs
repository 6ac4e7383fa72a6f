use std::collections::BTreeMap;

use derive_getters::Getters;
use derive_new::new;

use super::{Currency, SplitEvent, Symbol, Trade};

/// Whether split events could be applied to a holding's trades.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SplitStatus {
    Pending,
    Adjusted,
    Unadjusted(String),
}

/// A distinct symbol of the ledger and the trades that belong to it.
#[derive(Clone, Debug, Getters, new)]
pub struct Holding {
    symbol: Symbol,
    currency: Currency,
    trade_indices: Vec<usize>,
    #[new(default)]
    splits: Vec<SplitEvent>,
    #[new(value = "SplitStatus::Pending")]
    split_status: SplitStatus,
}

impl Holding {
    /// Indexes the distinct symbols of a ledger, ordered by symbol.
    pub fn index(trades: &[Trade]) -> Vec<Holding> {
        let mut by_symbol: BTreeMap<&Symbol, (Currency, Vec<usize>)> = BTreeMap::new();

        for (i, trade) in trades.iter().enumerate() {
            by_symbol
                .entry(trade.symbol())
                .or_insert_with(|| (*trade.currency(), Vec::new()))
                .1
                .push(i);
        }

        by_symbol
            .into_iter()
            .map(|(symbol, (currency, indices))| Holding::new(symbol.clone(), currency, indices))
            .collect()
    }

    pub fn trades<'a>(&self, ledger: &'a [Trade]) -> Vec<&'a Trade> {
        self.trade_indices
            .iter()
            .filter_map(|&i| ledger.get(i))
            .collect()
    }

    pub fn with_splits(self, splits: Vec<SplitEvent>, split_status: SplitStatus) -> Holding {
        Holding {
            splits,
            split_status,
            ..self
        }
    }

    pub fn is_split_adjusted(&self) -> bool {
        self.split_status == SplitStatus::Adjusted
    }
}
