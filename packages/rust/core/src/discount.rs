//! Discount parsing and resolution.
//!
//! ERP discounts arrive in one of three encodings:
//!
//! | Encoding   | Example     | Resolved against base `100` |
//! |------------|-------------|-----------------------------|
//! | percentage | `"10%"`     | `10.0`                      |
//! | currency   | `"R$10,50"` | `10.5` (absolute)           |
//! | plain      | `10`, `"7"` | `10.0`, `7.0`               |
//!
//! The encoding is decided once by [`parse_discount`]; resolution then
//! matches on the variant.

use orderbridge_shared::{PipelineError, Result};
use serde_json::Value;

/// Currency marker for absolute amounts.
const CURRENCY_MARKER: &str = "R$";

/// A parsed discount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discount {
    /// Percent of the base value (`10.0` means 10%).
    Percentage(f64),
    /// Absolute currency amount.
    Absolute(f64),
    /// Bare number, used as an absolute amount.
    Plain(f64),
}

impl Discount {
    /// Discount amount for an order worth `base`.
    pub fn resolve(&self, base: f64) -> f64 {
        match *self {
            Discount::Percentage(pct) => round_cents(base * (pct / 100.0)),
            Discount::Absolute(amount) | Discount::Plain(amount) => amount,
        }
    }
}

/// Decide the encoding of a raw `desconto` value.
///
/// Returns `None` for absent or falsy input (`null`, `false`, `0`, `""`,
/// empty array/object). Percentage is checked before currency, currency
/// before plain.
pub fn parse_discount(raw: &Value) -> Result<Option<Discount>> {
    if is_falsy(raw) {
        return Ok(None);
    }

    let discount = match raw {
        Value::String(s) if s.contains('%') => {
            Discount::Percentage(parse_number(&s.replace('%', ""), s)?)
        }
        Value::String(s) if s.contains(CURRENCY_MARKER) => {
            let normalized = s.replace(CURRENCY_MARKER, "").replace(',', ".");
            Discount::Absolute(parse_number(&normalized, s)?)
        }
        Value::String(s) => Discount::Plain(parse_number(s, s)?),
        Value::Number(n) => Discount::Plain(
            n.as_f64()
                .ok_or_else(|| PipelineError::parse(format!("invalid discount {n}")))?,
        ),
        Value::Bool(_) => Discount::Plain(1.0),
        other => {
            return Err(PipelineError::parse(format!(
                "unsupported discount value {other}"
            )));
        }
    };

    Ok(Some(discount))
}

/// Parse `raw` and resolve it against `base` in one step.
pub fn resolve_discount(raw: &Value, base: f64) -> Result<f64> {
    Ok(parse_discount(raw)?.map_or(0.0, |d| d.resolve(base)))
}

/// Round to two decimal places.
///
/// Rounds the exact binary value, so `2.675` (stored as `2.67499...`) becomes
/// `2.67`. Exact ties go to the even digit.
pub fn round_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Parse numeric text, tolerating surrounding whitespace.
///
/// `original` is only used for the error message.
pub(crate) fn parse_number(text: &str, original: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| PipelineError::parse(format!("invalid numeric value '{original}'")))
}

fn is_falsy(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
