//! Transaction feed data model: the raw records returned by the retrieval
//! service and the display-ready records derived from them.

use crate::core::currency::CurrencyFormatter;
use crate::core::error::{FeedError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Direction of a transaction. The amount itself is always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Outcome,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransactionKind::Income => "income",
                TransactionKind::Outcome => "outcome",
            }
        )
    }
}

impl FromStr for TransactionKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "outcome" => Ok(TransactionKind::Outcome),
            _ => Err(FeedError::Validation(format!(
                "unknown transaction type '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
}

/// Creation date of a transaction as sent by the service.
///
/// Numbers are epoch milliseconds, fractional ones floored to the millisecond.
/// Strings that are not RFC 3339 timestamps or plain ISO dates are kept as
/// text and parsed during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedAt {
    Millis(#[serde(deserialize_with = "epoch_millis")] i64),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Text(String),
}

fn epoch_millis<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(millis) = number.as_i64() {
        return Ok(millis);
    }
    // Saturating cast, so values outside i64 fail later as timestamps
    number
        .as_f64()
        .map(|millis| millis.floor() as i64)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid epoch milliseconds {number}")))
}

impl From<NaiveDate> for CreatedAt {
    fn from(date: NaiveDate) -> Self {
        CreatedAt::Date(date)
    }
}

impl From<DateTime<FixedOffset>> for CreatedAt {
    fn from(date: DateTime<FixedOffset>) -> Self {
        CreatedAt::DateTime(date)
    }
}

impl From<&str> for CreatedAt {
    fn from(text: &str) -> Self {
        CreatedAt::Text(text.to_string())
    }
}

/// A transaction exactly as returned by the retrieval service.
///
/// `kind` is kept as received so that an unrecognized type is reported as a
/// validation failure of the record instead of a decode failure of the whole
/// response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub id: String,
    pub title: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: Category,
    pub created_at: CreatedAt,
}

/// A transaction ready for display. Only produced by
/// [`RecordNormalizer`](crate::core::normalize::RecordNormalizer), so the
/// formatted fields always agree with the raw ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTransaction {
    id: String,
    title: String,
    value: f64,
    #[serde(rename = "type")]
    kind: TransactionKind,
    category: Category,
    created_at: CreatedAt,
    formatted_value: String,
    formatted_date: String,
}

impl DisplayTransaction {
    pub(crate) fn from_raw(
        raw: &RawTransaction,
        kind: TransactionKind,
        formatted_value: String,
        formatted_date: String,
    ) -> Self {
        Self {
            id: raw.id.clone(),
            title: raw.title.clone(),
            value: raw.value,
            kind,
            category: raw.category.clone(),
            created_at: raw.created_at.clone(),
            formatted_value,
            formatted_date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn created_at(&self) -> &CreatedAt {
        &self.created_at
    }

    pub fn formatted_value(&self) -> &str {
        &self.formatted_value
    }

    pub fn formatted_date(&self) -> &str {
        &self.formatted_date
    }
}

/// Aggregated totals, forwarded verbatim from the service.
///
/// Fields may arrive as JSON numbers or strings and are stored as text. They
/// are only coerced to numbers when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    #[serde(default, deserialize_with = "amount_text")]
    pub income: String,
    #[serde(default, deserialize_with = "amount_text")]
    pub outcome: String,
    #[serde(default, deserialize_with = "amount_text")]
    pub total: String,
}

impl BalanceSummary {
    pub fn formatted_income(&self, formatter: &CurrencyFormatter) -> Result<String> {
        formatter.format(coerce_amount("income", &self.income)?)
    }

    pub fn formatted_outcome(&self, formatter: &CurrencyFormatter) -> Result<String> {
        formatter.format(coerce_amount("outcome", &self.outcome)?)
    }

    pub fn formatted_total(&self, formatter: &CurrencyFormatter) -> Result<String> {
        formatter.format(coerce_amount("total", &self.total)?)
    }
}

/// Blank fields count as zero.
fn coerce_amount(field: &str, text: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    text.parse::<f64>().map_err(|e| {
        FeedError::Formatting(format!("balance {field} '{text}' is not a number: {e}"))
    })
}

fn amount_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(match Option::<Amount>::deserialize(deserializer)? {
        Some(Amount::Number(n)) => n.to_string(),
        Some(Amount::Text(s)) => s,
        None => String::new(),
    })
}

/// Body of a successful `GET transactions` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub transactions: Vec<RawTransaction>,
    #[serde(default)]
    pub balance: BalanceSummary,
}
