use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid series: {0}")]
  InvalidSeries(String),
  #[error("Invalid document type: {0}")]
  InvalidDocumentType(String),
  #[error("Invalid document number: {0}")]
  InvalidDocumentNumber(String),
  #[error("Invalid currency code: {0}")]
  InvalidCurrency(String),
  #[error("Invalid tax affectation type: {0}")]
  InvalidTaxAffectation(String),
}

lazy_static! {
  static ref CREDIT_DAYS: Regex =
    Regex::new(r"(?i)(\d+)\s*(?:d[ií]as?|days?)\b").expect("credit days pattern");
}

/// Days granted when a credit condition names no day count.
pub const DEFAULT_CREDIT_DAYS: u32 = 30;

/// Payment condition literal that marks a cash sale.
pub const CASH_CONDITION: &str = "Contado";

// Tax affectation type - SUNAT catalog 07
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TaxAffectationType {
  #[default]
  Taxed,
  Exempt,
  Unaffected,
  Export,
}

impl TaxAffectationType {
  pub fn code(&self) -> &'static str {
    match self {
      TaxAffectationType::Taxed => "10",
      TaxAffectationType::Exempt => "20",
      TaxAffectationType::Unaffected => "30",
      TaxAffectationType::Export => "40",
    }
  }

  /// Maps any catalog 07 code onto its family: 1x taxed, 2x exempt,
  /// 3x unaffected, 40 export.
  pub fn from_code(code: u16) -> Result<Self, ValueObjectError> {
    match code {
      10..=17 => Ok(TaxAffectationType::Taxed),
      20..=21 => Ok(TaxAffectationType::Exempt),
      30..=37 => Ok(TaxAffectationType::Unaffected),
      40 => Ok(TaxAffectationType::Export),
      _ => Err(ValueObjectError::InvalidTaxAffectation(code.to_string())),
    }
  }

  pub fn is_taxed(&self) -> bool {
    matches!(self, TaxAffectationType::Taxed)
  }
}

impl FromStr for TaxAffectationType {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if let Ok(code) = trimmed.parse::<u16>() {
      return Self::from_code(code);
    }
    match trimmed.to_lowercase().as_str() {
      "taxed" | "gravado" => Ok(TaxAffectationType::Taxed),
      "exempt" | "exonerado" => Ok(TaxAffectationType::Exempt),
      "unaffected" | "inafecto" => Ok(TaxAffectationType::Unaffected),
      "export" | "exportacion" | "exportación" => Ok(TaxAffectationType::Export),
      _ => Err(ValueObjectError::InvalidTaxAffectation(s.to_string())),
    }
  }
}

impl From<TaxAffectationType> for String {
  fn from(value: TaxAffectationType) -> Self {
    value.code().to_string()
  }
}

impl TryFrom<String> for TaxAffectationType {
  type Error = ValueObjectError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl fmt::Display for TaxAffectationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.code())
  }
}

// Payment condition - "Contado" or a credit term such as "Credito a 30 dias"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentCondition {
  Cash,
  Credit { days: Option<u32> },
}

impl PaymentCondition {
  /// Never fails: anything that is not the cash literal is a credit sale.
  pub fn parse(value: &str) -> Self {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case(CASH_CONDITION) {
      return PaymentCondition::Cash;
    }

    let days = CREDIT_DAYS
      .captures(trimmed)
      .and_then(|caps| caps.get(1))
      .and_then(|m| m.as_str().parse::<u32>().ok());

    PaymentCondition::Credit { days }
  }

  pub fn is_cash(&self) -> bool {
    matches!(self, PaymentCondition::Cash)
  }

  pub fn is_credit(&self) -> bool {
    !self.is_cash()
  }

  pub fn days_or(&self, default_days: u32) -> u32 {
    match self {
      PaymentCondition::Cash => 0,
      PaymentCondition::Credit { days } => days.unwrap_or(default_days),
    }
  }
}

// Series - 4 characters, first one F (factura), B (boleta) or T (guia)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series(String);

impl Series {
  pub fn new(value: &str) -> Result<Self, ValueObjectError> {
    let normalized = value.trim().to_uppercase();
    if normalized.chars().count() != 4 {
      return Err(ValueObjectError::InvalidSeries(
        "Series must be exactly 4 characters".to_string(),
      ));
    }
    if !normalized.starts_with(['F', 'B', 'T']) {
      return Err(ValueObjectError::InvalidSeries(
        "Series must start with F, B or T".to_string(),
      ));
    }
    if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
      return Err(ValueObjectError::InvalidSeries(
        "Series must be alphanumeric".to_string(),
      ));
    }
    Ok(Self(normalized))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Series {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Identity document type - SUNAT catalog 06
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DocumentType {
  NoDocument,
  Dni,
  ForeignerCard,
  Ruc,
  Passport,
}

impl DocumentType {
  pub fn code(&self) -> &'static str {
    match self {
      DocumentType::NoDocument => "0",
      DocumentType::Dni => "1",
      DocumentType::ForeignerCard => "4",
      DocumentType::Ruc => "6",
      DocumentType::Passport => "7",
    }
  }

  pub fn validate_number(&self, number: &str) -> Result<(), ValueObjectError> {
    let number = number.trim();
    let all_digits = number.chars().all(|c| c.is_ascii_digit());
    match self {
      DocumentType::Ruc if number.len() != 11 || !all_digits => Err(
        ValueObjectError::InvalidDocumentNumber("RUC must have 11 digits".to_string()),
      ),
      DocumentType::Ruc if !matches!(&number[..2], "10" | "15" | "17" | "20") => Err(
        ValueObjectError::InvalidDocumentNumber(
          "RUC must start with 10, 15, 17 or 20".to_string(),
        ),
      ),
      DocumentType::Dni if number.len() != 8 || !all_digits => Err(
        ValueObjectError::InvalidDocumentNumber("DNI must have 8 digits".to_string()),
      ),
      DocumentType::ForeignerCard | DocumentType::Passport
        if number.is_empty() || number.len() > 12 =>
      {
        Err(ValueObjectError::InvalidDocumentNumber(
          "Document number must have between 1 and 12 characters".to_string(),
        ))
      }
      _ => Ok(()),
    }
  }
}

impl FromStr for DocumentType {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "0" | "-" => Ok(DocumentType::NoDocument),
      "1" | "DNI" => Ok(DocumentType::Dni),
      "4" | "CE" => Ok(DocumentType::ForeignerCard),
      "6" | "RUC" => Ok(DocumentType::Ruc),
      "7" | "PASAPORTE" | "PASSPORT" => Ok(DocumentType::Passport),
      _ => Err(ValueObjectError::InvalidDocumentType(s.to_string())),
    }
  }
}

impl From<DocumentType> for String {
  fn from(value: DocumentType) -> Self {
    value.code().to_string()
  }
}

impl TryFrom<String> for DocumentType {
  type Error = ValueObjectError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

// Currency - ISO 4217, the two SUNAT accepts for domestic invoices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
  PEN,
  USD,
}

impl Currency {
  pub fn as_str(&self) -> &'static str {
    match self {
      Currency::PEN => "PEN",
      Currency::USD => "USD",
    }
  }
}

impl FromStr for Currency {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "PEN" => Ok(Currency::PEN),
      "USD" => Ok(Currency::USD),
      _ => Err(ValueObjectError::InvalidCurrency(format!(
        "Unsupported currency: {}",
        s
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tax_affectation_codes() {
    assert_eq!(TaxAffectationType::Taxed.code(), "10");
    assert_eq!(TaxAffectationType::from_code(13).unwrap(), TaxAffectationType::Taxed);
    assert_eq!(TaxAffectationType::from_code(21).unwrap(), TaxAffectationType::Exempt);
    assert_eq!(
      TaxAffectationType::from_code(31).unwrap(),
      TaxAffectationType::Unaffected
    );
    assert_eq!(TaxAffectationType::from_code(40).unwrap(), TaxAffectationType::Export);
    assert!(TaxAffectationType::from_code(50).is_err());
  }

  #[test]
  fn test_tax_affectation_from_str() {
    assert_eq!(
      TaxAffectationType::from_str("exonerado").unwrap(),
      TaxAffectationType::Exempt
    );
    assert_eq!(
      TaxAffectationType::from_str(" 30 ").unwrap(),
      TaxAffectationType::Unaffected
    );
    assert!(TaxAffectationType::from_str("zero-rated").is_err());
  }

  #[test]
  fn test_tax_affectation_serializes_as_code() {
    let json = serde_json::to_string(&TaxAffectationType::Export).unwrap();
    assert_eq!(json, "\"40\"");
    let parsed: TaxAffectationType = serde_json::from_str("\"20\"").unwrap();
    assert_eq!(parsed, TaxAffectationType::Exempt);
  }

  #[test]
  fn test_payment_condition_cash() {
    assert_eq!(PaymentCondition::parse("Contado"), PaymentCondition::Cash);
    assert_eq!(PaymentCondition::parse(" contado "), PaymentCondition::Cash);
    assert_eq!(PaymentCondition::Cash.days_or(30), 0);
  }

  #[test]
  fn test_payment_condition_credit_days() {
    assert_eq!(
      PaymentCondition::parse("Credito a 45 dias"),
      PaymentCondition::Credit { days: Some(45) }
    );
    assert_eq!(
      PaymentCondition::parse("Crédito 60 DÍAS"),
      PaymentCondition::Credit { days: Some(60) }
    );
    assert_eq!(
      PaymentCondition::parse("Net 15 days"),
      PaymentCondition::Credit { days: Some(15) }
    );
    assert_eq!(
      PaymentCondition::parse("Credito"),
      PaymentCondition::Credit { days: None }
    );
    assert_eq!(PaymentCondition::parse("Credito").days_or(30), 30);
  }

  #[test]
  fn test_payment_condition_ignores_numbers_without_days() {
    let condition = PaymentCondition::parse("Credito 2 cuotas, 90 dias");
    assert_eq!(condition, PaymentCondition::Credit { days: Some(90) });
  }

  #[test]
  fn test_series() {
    assert_eq!(Series::new("f001").unwrap().value(), "F001");
    assert!(Series::new("B001").is_ok());
    assert!(Series::new("T001").is_ok());
    assert!(Series::new("X001").is_err());
    assert!(Series::new("F01").is_err());
    assert!(Series::new("F0-1").is_err());
  }

  #[test]
  fn test_document_numbers() {
    assert!(DocumentType::Ruc.validate_number("20123456789").is_ok());
    assert!(DocumentType::Ruc.validate_number("2012345678").is_err());
    assert!(DocumentType::Ruc.validate_number("30123456789").is_err());
    assert!(DocumentType::Dni.validate_number("12345678").is_ok());
    assert!(DocumentType::Dni.validate_number("1234567A").is_err());
    assert!(DocumentType::Passport.validate_number("").is_err());
    assert!(DocumentType::NoDocument.validate_number("").is_ok());
  }

  #[test]
  fn test_document_type_from_str() {
    assert_eq!(DocumentType::from_str("6").unwrap(), DocumentType::Ruc);
    assert_eq!(DocumentType::from_str("dni").unwrap(), DocumentType::Dni);
    assert!(DocumentType::from_str("9").is_err());
  }

  #[test]
  fn test_currency() {
    assert_eq!(Currency::PEN.as_str(), "PEN");
    assert_eq!(Currency::from_str("usd").unwrap(), Currency::USD);
    assert!(Currency::from_str("EUR").is_err());
  }
}
