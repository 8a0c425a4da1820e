use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::lenient;
use crate::domain::invoice::calculator::derive_due_date_with_default;
use crate::domain::invoice::entities::{
  DEFAULT_TAX_RATE_PERCENT, DEFAULT_UNIT_MEASURE, MAX_INSTALLMENTS,
};
use crate::domain::invoice::value_objects::{CASH_CONDITION, DEFAULT_CREDIT_DAYS};
use crate::domain::invoice::{Customer, InvoiceDraft, LineItem, TaxAffectationType};

/// Values filled in when the form leaves a field empty.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicingDefaults {
  pub tax_rate_percent: Decimal,
  pub credit_days: u32,
  pub currency: String,
  pub unit_measure: String,
}

impl Default for InvoicingDefaults {
  fn default() -> Self {
    Self {
      tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
      credit_days: DEFAULT_CREDIT_DAYS,
      currency: "PEN".to_string(),
      unit_measure: DEFAULT_UNIT_MEASURE.to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CustomerCommand {
  #[serde(default)]
  #[validate(length(max = 2, message = "Document type must be a catalog code"))]
  pub document_type: String,
  #[serde(default)]
  #[validate(length(max = 15, message = "Document number cannot exceed 15 characters"))]
  pub document_number: String,
  #[serde(default)]
  #[validate(length(max = 500, message = "Legal name cannot exceed 500 characters"))]
  pub legal_name: String,
  #[serde(default)]
  #[validate(length(max = 500, message = "Address cannot exceed 500 characters"))]
  pub address: String,
  #[serde(default)]
  #[validate(email(message = "Invalid customer email format"))]
  pub email: Option<String>,
  #[serde(default)]
  #[validate(length(max = 20, message = "Phone cannot exceed 20 characters"))]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LineItemCommand {
  #[serde(default)]
  #[validate(length(max = 30, message = "Product code cannot exceed 30 characters"))]
  pub code: String,
  #[serde(default)]
  #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
  pub description: String,
  #[serde(default)]
  pub unit_measure: Option<String>,
  #[serde(default, deserialize_with = "lenient::decimal")]
  pub quantity: Decimal,
  #[serde(default, deserialize_with = "lenient::decimal")]
  pub unit_price: Decimal,
  #[serde(default, deserialize_with = "lenient::tax_affectation")]
  pub tax_affectation_type: TaxAffectationType,
  #[serde(default, deserialize_with = "lenient::flag")]
  pub price_includes_tax: bool,
  #[serde(default, deserialize_with = "lenient::optional_decimal")]
  pub tax_rate_percent: Option<Decimal>,
  #[serde(default, deserialize_with = "lenient::optional_decimal")]
  pub discount: Option<Decimal>,
}

/// Invoice form as posted by a client. Numeric fields are lenient so a
/// half-filled form still previews.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InvoiceDraftCommand {
  #[serde(default)]
  pub series: String,
  #[serde(default, deserialize_with = "lenient::optional_number")]
  pub number: Option<u32>,
  #[serde(default, deserialize_with = "lenient::date")]
  pub issue_date: Option<NaiveDate>,
  #[serde(default)]
  #[validate(nested)]
  pub customer: CustomerCommand,
  #[serde(default)]
  #[validate(nested)]
  pub line_items: Vec<LineItemCommand>,
  #[serde(default)]
  pub currency: Option<String>,
  #[serde(default)]
  pub payment_method: String,
  #[serde(default)]
  pub payment_condition: Option<String>,
  #[serde(default, deserialize_with = "lenient::count")]
  pub installment_count: u32,
  #[serde(default, deserialize_with = "lenient::decimal")]
  pub global_discount_percent: Decimal,
}

impl InvoiceDraftCommand {
  /// Builds the domain draft, filling blanks from `defaults`. A missing
  /// issue date becomes `today`; an empty item list becomes one blank row.
  pub fn into_draft(self, defaults: &InvoicingDefaults, today: NaiveDate) -> InvoiceDraft {
    let issue_date = self.issue_date.unwrap_or(today);
    let mut draft = InvoiceDraft::new(issue_date);

    let line_items: Vec<LineItem> = self
      .line_items
      .into_iter()
      .map(|item| LineItem {
        code: item.code,
        description: item.description,
        unit_measure: item
          .unit_measure
          .filter(|u| !u.trim().is_empty())
          .unwrap_or_else(|| defaults.unit_measure.clone()),
        quantity: item.quantity,
        unit_price: item.unit_price,
        tax_affectation: item.tax_affectation_type,
        price_includes_tax: item.price_includes_tax,
        tax_rate_percent: item.tax_rate_percent.unwrap_or(defaults.tax_rate_percent),
        discount: item.discount,
      })
      .collect();
    if !line_items.is_empty() {
      draft.line_items = line_items;
    } else {
      draft.line_items[0].unit_measure = defaults.unit_measure.clone();
      draft.line_items[0].tax_rate_percent = defaults.tax_rate_percent;
    }

    let customer = self.customer;
    draft.customer = Customer {
      document_type: customer.document_type,
      document_number: customer.document_number,
      legal_name: customer.legal_name,
      address: customer.address,
      email: customer.email,
      phone: customer.phone,
    };

    draft.series = self.series;
    draft.number = self.number;
    draft.currency = self
      .currency
      .filter(|c| !c.trim().is_empty())
      .unwrap_or_else(|| defaults.currency.clone());
    draft.payment_method = self.payment_method;
    draft.payment_condition = self
      .payment_condition
      .filter(|c| !c.trim().is_empty())
      .unwrap_or_else(|| CASH_CONDITION.to_string());
    draft.installment_count = self.installment_count.clamp(1, MAX_INSTALLMENTS);
    draft.global_discount_percent = self.global_discount_percent;
    draft.due_date =
      derive_due_date_with_default(issue_date, &draft.payment_condition, defaults.credit_days);

    draft
  }
}
