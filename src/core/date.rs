//! Locale-independent `DD/MM/YYYY` rendering of transaction dates.

use crate::core::error::{FeedError, Result};
use crate::core::transaction::CreatedAt;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DISPLAY_FORMAT: &str = "%d/%m/%Y";

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn normalize_date(date: &CreatedAt) -> Result<String> {
    Ok(calendar_date(date)?.format(DISPLAY_FORMAT).to_string())
}

/// Resolves a date value to its calendar day.
///
/// Timestamps carrying an offset resolve in that offset, epoch milliseconds
/// in UTC. The host time zone is never consulted.
pub fn calendar_date(date: &CreatedAt) -> Result<NaiveDate> {
    match date {
        CreatedAt::Millis(millis) => DateTime::<Utc>::from_timestamp_millis(*millis)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| {
                FeedError::Formatting(format!("timestamp {millis} is out of range"))
            }),
        CreatedAt::DateTime(dt) => Ok(dt.date_naive()),
        CreatedAt::Date(date) => Ok(*date),
        CreatedAt::Text(text) => parse_date_text(text),
    }
}

fn parse_date_text(text: &str) -> Result<NaiveDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| FeedError::Formatting(format!("unparsable date '{text}': {e}")))
}
