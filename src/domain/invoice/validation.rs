use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::calculator;
use super::entities::{InvoiceDraft, LineItem, MAX_INSTALLMENTS};
use super::value_objects::{Currency, DocumentType, PaymentCondition, Series};

/// Field-level messages collected by [`validate_draft`], keyed by field path
/// (`customer.document_number`, `line_items[2].quantity`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
  fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self
      .fields
      .entry(field.into())
      .or_default()
      .push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn contains(&self, field: &str) -> bool {
    self.fields.contains_key(field)
  }

  pub fn messages(&self, field: &str) -> &[String] {
    self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
  }

  fn into_result(self) -> Result<(), ValidationErrors> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self
      .fields
      .iter()
      .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
      .collect();
    write!(f, "{}", parts.join("; "))
  }
}

impl std::error::Error for ValidationErrors {}

/// Checks a draft before submission. The calculator never calls this; it is
/// the gate in front of the backend API.
pub fn validate_draft(draft: &InvoiceDraft) -> Result<(), ValidationErrors> {
  let mut errors = ValidationErrors::new();

  if let Err(e) = Series::new(&draft.series) {
    errors.add("series", e.to_string());
  }
  if draft.number == Some(0) {
    errors.add("number", "Number must be at least 1");
  }
  if Currency::from_str(&draft.currency).is_err() {
    errors.add("currency", format!("Unsupported currency: {}", draft.currency));
  }
  if draft.payment_method.trim().is_empty() {
    errors.add("payment_method", "Payment method is required");
  }
  if draft.payment_condition.trim().is_empty() {
    errors.add("payment_condition", "Payment condition is required");
  } else if PaymentCondition::parse(&draft.payment_condition).is_credit() {
    if draft.installment_count < 1 {
      errors.add("installment_count", "Credit sales need at least one installment");
    } else if draft.installment_count > MAX_INSTALLMENTS {
      errors.add(
        "installment_count",
        format!("At most {} installments are allowed", MAX_INSTALLMENTS),
      );
    }
  }
  if draft.global_discount_percent < Decimal::ZERO
    || draft.global_discount_percent > Decimal::ONE_HUNDRED
  {
    errors.add(
      "global_discount_percent",
      "Global discount must be between 0 and 100",
    );
  }

  validate_customer(draft, &mut errors);

  if draft.line_items.iter().all(LineItem::is_blank) {
    errors.add("line_items", "At least one line item is required");
  } else {
    // blank rows are dropped on submission; indices stay those of the form
    for (index, item) in draft
      .line_items
      .iter()
      .enumerate()
      .filter(|(_, item)| !item.is_blank())
    {
      validate_line_item(index, item, &mut errors);
    }
  }

  errors.into_result()
}

fn validate_customer(draft: &InvoiceDraft, errors: &mut ValidationErrors) {
  let customer = &draft.customer;

  match DocumentType::from_str(&customer.document_type) {
    Ok(document_type) => {
      if let Err(e) = document_type.validate_number(&customer.document_number) {
        errors.add("customer.document_number", e.to_string());
      }
      // Facturas are only issued to RUC holders
      if draft.series.trim().to_uppercase().starts_with('F') && document_type != DocumentType::Ruc
      {
        errors.add(
          "customer.document_type",
          "Invoices with an F series require a RUC customer",
        );
      }
    }
    Err(e) => errors.add("customer.document_type", e.to_string()),
  }

  if customer.legal_name.trim().is_empty() {
    errors.add("customer.legal_name", "Legal name is required");
  }
  if customer.address.trim().is_empty() {
    errors.add("customer.address", "Address is required");
  }
}

fn validate_line_item(index: usize, item: &LineItem, errors: &mut ValidationErrors) {
  let field = |name: &str| format!("line_items[{}].{}", index, name);

  if item.description.trim().is_empty() {
    errors.add(field("description"), "Description is required");
  }
  if item.unit_measure.trim().is_empty() {
    errors.add(field("unit_measure"), "Unit of measure is required");
  }
  if item.quantity <= Decimal::ZERO {
    errors.add(field("quantity"), "Quantity must be greater than zero");
  }
  if item.unit_price <= Decimal::ZERO {
    errors.add(field("unit_price"), "Unit price must be greater than zero");
  }
  if item.tax_rate_percent < Decimal::ZERO || item.tax_rate_percent > Decimal::ONE_HUNDRED {
    errors.add(field("tax_rate_percent"), "Tax rate must be between 0 and 100");
  }
  if item.discount.is_some_and(|d| d < Decimal::ZERO) {
    errors.add(field("discount"), "Discount cannot be negative");
  }
  // the calculator skips rows it cannot total
  if item.is_billable() && calculator::compute_line(item).is_none() {
    errors.add(field("unit_price"), "Line amount is too large");
  }
}
