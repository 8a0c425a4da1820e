use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::value_objects::{CASH_CONDITION, TaxAffectationType};

/// IGV rate applied when a line item names none.
pub const DEFAULT_TAX_RATE_PERCENT: Decimal = dec!(18);

/// SUNAT catalog 03 code for "unit (goods)".
pub const DEFAULT_UNIT_MEASURE: &str = "NIU";

/// Longest credit schedule a draft may carry.
pub const MAX_INSTALLMENTS: u32 = 60;

// Line Item - one row of the invoice form, possibly still being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
  pub code: String,
  pub description: String,
  pub unit_measure: String,
  pub quantity: Decimal,
  pub unit_price: Decimal,
  pub tax_affectation: TaxAffectationType,
  pub price_includes_tax: bool,
  pub tax_rate_percent: Decimal,
  pub discount: Option<Decimal>,
}

impl LineItem {
  pub fn new(
    quantity: Decimal,
    unit_price: Decimal,
    tax_affectation: TaxAffectationType,
  ) -> Self {
    Self {
      quantity,
      unit_price,
      tax_affectation,
      ..Self::default()
    }
  }

  pub fn with_price_including_tax(mut self) -> Self {
    self.price_includes_tax = true;
    self
  }

  pub fn with_tax_rate(mut self, tax_rate_percent: Decimal) -> Self {
    self.tax_rate_percent = tax_rate_percent;
    self
  }

  pub fn with_discount(mut self, discount: Decimal) -> Self {
    self.discount = Some(discount);
    self
  }

  pub fn with_description(mut self, code: &str, description: &str) -> Self {
    self.code = code.to_string();
    self.description = description.to_string();
    self
  }

  /// Quantity times unit price, before discount or tax extraction. `None`
  /// when the product does not fit in a `Decimal`.
  pub fn gross_value(&self) -> Option<Decimal> {
    self.quantity.checked_mul(self.unit_price)
  }

  /// Rows with a non-positive quantity or price are still being typed.
  pub fn is_billable(&self) -> bool {
    self.quantity > Decimal::ZERO && self.unit_price > Decimal::ZERO
  }

  pub fn is_blank(&self) -> bool {
    self.description.trim().is_empty()
      && self.code.trim().is_empty()
      && self.quantity.is_zero()
      && self.unit_price.is_zero()
  }
}

impl Default for LineItem {
  fn default() -> Self {
    Self {
      code: String::new(),
      description: String::new(),
      unit_measure: DEFAULT_UNIT_MEASURE.to_string(),
      quantity: Decimal::ZERO,
      unit_price: Decimal::ZERO,
      tax_affectation: TaxAffectationType::Taxed,
      price_includes_tax: false,
      tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
      discount: None,
    }
  }
}

// Customer - raw form fields, checked by the validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
  pub document_type: String,
  pub document_number: String,
  pub legal_name: String,
  pub address: String,
  pub email: Option<String>,
  pub phone: Option<String>,
}

// Invoice Draft - the state owned by one form session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
  pub series: String,
  pub number: Option<u32>,
  pub customer: Customer,
  pub line_items: Vec<LineItem>,
  pub currency: String,
  pub payment_method: String,
  pub payment_condition: String,
  pub installment_count: u32,
  pub global_discount_percent: Decimal,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
}

impl InvoiceDraft {
  /// Empty draft with a single blank row, paid in cash.
  pub fn new(issue_date: NaiveDate) -> Self {
    Self {
      series: String::new(),
      number: None,
      customer: Customer::default(),
      line_items: vec![LineItem::default()],
      currency: "PEN".to_string(),
      payment_method: String::new(),
      payment_condition: CASH_CONDITION.to_string(),
      installment_count: 1,
      global_discount_percent: Decimal::ZERO,
      issue_date,
      due_date: issue_date,
    }
  }

  pub fn billable_items(&self) -> impl Iterator<Item = &LineItem> {
    self.line_items.iter().filter(|item| item.is_billable())
  }
}

// Totals - derived, never stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
  pub taxed_base: Decimal,
  pub exempt_base: Decimal,
  pub unaffected_base: Decimal,
  pub export_base: Decimal,
  pub tax: Decimal,
  pub discount: Decimal,
  pub total: Decimal,
}

impl Totals {
  pub fn subtotal(&self) -> Decimal {
    self
      .taxed_base
      .saturating_add(self.exempt_base)
      .saturating_add(self.unaffected_base)
      .saturating_add(self.export_base)
  }
}

// Installment - one credit quota
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
  pub number: u32,
  pub amount: Decimal,
  pub due_date: NaiveDate,
}

// Line Breakdown - per-row figures shown next to each item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreakdown {
  pub base: Decimal,
  pub tax: Decimal,
  pub total: Decimal,
}

// Invoice Preview - everything the form displays after a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicePreview {
  pub lines: Vec<Option<LineBreakdown>>,
  pub totals: Totals,
  pub due_date: NaiveDate,
  pub installments: Vec<Installment>,
}
