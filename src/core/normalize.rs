//! Turns raw transactions into display-ready records.

use crate::core::currency::CurrencyFormatter;
use crate::core::date::normalize_date;
use crate::core::error::{FeedError, Result};
use crate::core::transaction::{DisplayTransaction, RawTransaction, TransactionKind};

/// Prepended to the formatted amount of outgoing transactions.
pub const OUTCOME_MARKER: &str = "- ";

#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    currency: CurrencyFormatter,
}

impl RecordNormalizer {
    pub fn new(currency: CurrencyFormatter) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> &CurrencyFormatter {
        &self.currency
    }

    /// Validates `raw` and attaches its formatted value and date to a copy.
    pub fn normalize(&self, raw: &RawTransaction) -> Result<DisplayTransaction> {
        self.normalize_record(raw).map_err(|e| e.in_record(&raw.id))
    }

    /// Normalizes every record in order. The first failing record aborts the
    /// whole batch.
    pub fn normalize_all(&self, raws: &[RawTransaction]) -> Result<Vec<DisplayTransaction>> {
        raws.iter().map(|raw| self.normalize(raw)).collect()
    }

    fn normalize_record(&self, raw: &RawTransaction) -> Result<DisplayTransaction> {
        let kind: TransactionKind = raw.kind.parse()?;
        if raw.value < 0.0 {
            return Err(FeedError::Validation(format!(
                "negative value {}, direction must be carried by type",
                raw.value
            )));
        }

        let formatted_date = normalize_date(&raw.created_at)?;
        let amount = self.currency.format(raw.value)?;
        let formatted_value = match kind {
            TransactionKind::Income => amount,
            TransactionKind::Outcome => format!("{OUTCOME_MARKER}{amount}"),
        };

        Ok(DisplayTransaction::from_raw(
            raw,
            kind,
            formatted_value,
            formatted_date,
        ))
    }
}
