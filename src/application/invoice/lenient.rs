//! Serde helpers for form payloads that may be half-typed.
//!
//! Every helper accepts JSON numbers, numeric strings, blanks and nulls and
//! falls back to zero or `None` instead of rejecting the payload.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::domain::invoice::TaxAffectationType;

/// Parses `"12.50"`, `" 3 "`, `"1e2"` and `"12,50"`; anything else is `None`.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
    trimmed.replace(',', ".")
  } else {
    trimmed.replace(',', "")
  };
  Decimal::from_str(&normalized)
    .or_else(|_| Decimal::from_scientific(&normalized))
    .ok()
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
  match value {
    Value::Number(n) => parse_decimal(&n.to_string()),
    Value::String(s) => parse_decimal(s),
    _ => None,
  }
}

pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(
    value
      .as_ref()
      .and_then(decimal_from_value)
      .unwrap_or(Decimal::ZERO),
  )
}

pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value.as_ref().and_then(decimal_from_value))
}

/// Non-negative integer; fractions are truncated, garbage becomes zero.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  let count = value
    .as_ref()
    .and_then(decimal_from_value)
    .filter(|d| *d > Decimal::ZERO)
    .map(|d| d.trunc().to_u32().unwrap_or(u32::MAX))
    .unwrap_or(0);
  Ok(count)
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
    Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
    _ => None,
  })
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Bool(b)) => b,
    Some(Value::Number(n)) => n.as_i64() == Some(1),
    Some(Value::String(s)) => {
      matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "on" | "si" | "sí")
    }
    _ => false,
  })
}

/// Unknown codes fall back to taxed, the form's default row type.
pub fn tax_affectation<'de, D>(deserializer: D) -> Result<TaxAffectationType, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  let parsed = match value {
    Some(Value::Number(n)) => n
      .as_u64()
      .and_then(|code| u16::try_from(code).ok())
      .and_then(|code| TaxAffectationType::from_code(code).ok()),
    Some(Value::String(s)) => TaxAffectationType::from_str(&s).ok(),
    _ => None,
  };
  Ok(parsed.unwrap_or_default())
}

pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
    _ => None,
  })
}
