use derive_getters::Getters;
use derive_new::new;

use super::Symbol;
use crate::error::{ComputationError, DataGapError, InvalidRecordError};

/// A ledger row excluded by the normalizer.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct RejectedRecord {
    source_file: String,
    row: usize,
    error: InvalidRecordError,
}

#[derive(Clone, Debug, PartialEq)]
pub enum QualityNote {
    DataGap(DataGapError),
    InvalidRecord(RejectedRecord),
    Computation {
        symbol: Symbol,
        error: ComputationError,
    },
}

/// Everything that used a fallback or failed outright during a run.
#[derive(Clone, Debug, Default, Getters)]
pub struct QualityReport {
    notes: Vec<QualityNote>,
}

impl QualityReport {
    pub fn gap(&mut self, error: DataGapError) {
        log::warn!("{}", error);
        self.notes.push(QualityNote::DataGap(error));
    }

    pub fn rejected(&mut self, record: RejectedRecord) {
        self.notes.push(QualityNote::InvalidRecord(record));
    }

    pub fn computation(&mut self, symbol: Symbol, error: ComputationError) {
        log::warn!("XIRR for {}: {}", symbol, error);
        self.notes.push(QualityNote::Computation { symbol, error });
    }

    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn gaps(&self) -> impl Iterator<Item = &DataGapError> {
        self.notes.iter().filter_map(|note| match note {
            QualityNote::DataGap(gap) => Some(gap),
            _ => None,
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.notes
            .iter()
            .map(|note| match note {
                QualityNote::DataGap(gap) => format!("data gap: {}", gap),
                QualityNote::InvalidRecord(record) => format!(
                    "rejected {} row {}: {}",
                    record.source_file(),
                    record.row(),
                    record.error()
                ),
                QualityNote::Computation { symbol, error } => {
                    format!("returns {}: {}", symbol, error)
                }
            })
            .collect()
    }
}
