//! Canonical display text for monetary amounts.

use crate::core::error::{FeedError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Symbol and separators used when rendering amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "R$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }
}

/// Renders amounts with exactly two fractional digits, grouped thousands and
/// a symbol prefix, e.g. `R$ 1.234,50`.
///
/// Rounding happens on the exact binary value of the input, half away from
/// zero, so equal inputs always yield identical text.
#[derive(Debug, Clone, Default)]
pub struct CurrencyFormatter {
    format: CurrencyFormat,
}

impl CurrencyFormatter {
    pub fn new(format: CurrencyFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, value: f64) -> Result<String> {
        if !value.is_finite() {
            return Err(FeedError::Formatting(format!(
                "cannot format non-finite amount {value}"
            )));
        }

        let (negative, digits) = match decimal_cents(value) {
            // -0.001 rounds to zero and is shown unsigned
            Some(rounded) => (
                rounded.is_sign_negative() && !rounded.is_zero(),
                rounded.abs().to_string(),
            ),
            // Beyond the range of Decimal every f64 is a whole number
            None => (value.is_sign_negative(), format!("{:.2}", value.abs())),
        };
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut text = String::new();
        if negative {
            text.push('-');
        }
        if !self.format.symbol.is_empty() {
            text.push_str(&self.format.symbol);
            text.push(' ');
        }
        text.push_str(&group_thousands(whole, self.format.thousands_separator));
        text.push(self.format.decimal_separator);
        text.push_str(cents);
        Ok(text)
    }
}

/// Rounds to cents, half away from zero. `None` when the amount cannot be held
/// as a `Decimal` with exactly two fractional digits.
fn decimal_cents(value: f64) -> Option<Decimal> {
    let mut rounded = Decimal::from_f64_retain(value)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    (rounded.scale() == 2).then_some(rounded)
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouping_and_decimals() {
        let formatter = CurrencyFormatter::default();

        assert_eq!(formatter.format(1234.5).unwrap(), "R$ 1.234,50");
        assert_eq!(formatter.format(2000.0).unwrap(), "R$ 2.000,00");
        assert_eq!(formatter.format(0.0).unwrap(), "R$ 0,00");
        assert_eq!(formatter.format(999.999).unwrap(), "R$ 1.000,00");
        assert_eq!(formatter.format(12.3).unwrap(), "R$ 12,30");
        assert_eq!(formatter.format(1234567.891).unwrap(), "R$ 1.234.567,89");
        assert_eq!(formatter.format(100000.0).unwrap(), "R$ 100.000,00");
    }

    #[test]
    fn test_format_is_stable() {
        let formatter = CurrencyFormatter::default();
        for value in [0.1, 0.125, 1.005, 1500.75, 42.0] {
            assert_eq!(formatter.format(value).unwrap(), formatter.format(value).unwrap());
        }
        assert_ne!(formatter.format(0.0).unwrap(), formatter.format(0.01).unwrap());
        assert_ne!(formatter.format(0.0).unwrap(), formatter.format(-0.01).unwrap());
    }

    #[test]
    fn test_format_negative_amounts() {
        let formatter = CurrencyFormatter::default();
        assert_eq!(formatter.format(-50.0).unwrap(), "-R$ 50,00");
        assert_eq!(formatter.format(-1234.5).unwrap(), "-R$ 1.234,50");
        assert_eq!(formatter.format(-0.001).unwrap(), "R$ 0,00");
    }

    #[test]
    fn test_format_rejects_non_finite() {
        let formatter = CurrencyFormatter::default();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = formatter.format(value).unwrap_err();
            assert!(err.is_formatting(), "expected formatting error for {value}");
        }
    }

    #[test]
    fn test_format_large_amounts() {
        let formatter = CurrencyFormatter::default();

        assert_eq!(
            formatter.format(1e27).unwrap(),
            "R$ 1.000.000.000.000.000.013.287.555.072,00"
        );
        assert_eq!(
            formatter.format(-1e27).unwrap(),
            "-R$ 1.000.000.000.000.000.013.287.555.072,00"
        );

        for value in [1e29, 1e300, f64::MAX] {
            let text = formatter.format(value).unwrap();
            let (whole, cents) = text
                .strip_prefix("R$ ")
                .and_then(|amount| amount.split_once(','))
                .unwrap();
            assert_eq!(cents, "00", "bad cents for {value}");
            let digits: String = whole.chars().filter(|c| *c != '.').collect();
            assert_eq!(digits, format!("{value:.0}"));
        }
    }

    #[test]
    fn test_custom_format() {
        let formatter = CurrencyFormatter::new(CurrencyFormat {
            symbol: "$".to_string(),
            thousands_separator: ',',
            decimal_separator: '.',
        });
        assert_eq!(formatter.format(1234.5).unwrap(), "$ 1,234.50");

        let bare = CurrencyFormatter::new(CurrencyFormat {
            symbol: String::new(),
            ..CurrencyFormat::default()
        });
        assert_eq!(bare.format(7.0).unwrap(), "7,00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1", '.'), "1");
        assert_eq!(group_thousands("123", '.'), "123");
        assert_eq!(group_thousands("1234", '.'), "1.234");
        assert_eq!(group_thousands("123456", '.'), "123.456");
        assert_eq!(group_thousands("1234567", ' '), "1 234 567");
    }
}
