use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::calculator;
use super::entities::{InvoiceDraft, Totals};
use super::validation::{ValidationErrors, validate_draft};
use super::value_objects::{
  Currency, DocumentType, PaymentCondition, Series, TaxAffectationType,
};

/// Body of `POST /invoices` on the invoicing backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
  pub series: Series,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub number: Option<u32>,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub customer: CustomerPayload,
  pub line_items: Vec<LineItemPayload>,
  pub currency: Currency,
  pub payment_method: String,
  pub payment_condition: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub installments: Vec<InstallmentPayload>,
  pub global_discount_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
  pub document_type: DocumentType,
  pub document_number: String,
  pub legal_name: String,
  pub address: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
  pub code: String,
  pub description: String,
  pub quantity: Decimal,
  pub unit_measure: String,
  pub unit_price: Decimal,
  pub tax_affectation_type: TaxAffectationType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub discount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPayload {
  pub number: u32,
  pub amount: Decimal,
  pub due_date: NaiveDate,
}

/// What the backend answers after accepting an invoice. Its totals are the
/// system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSubmission {
  pub id: String,
  pub series: String,
  pub number: u32,
  pub status: String,
  #[serde(default)]
  pub totals: Option<BackendTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendTotals {
  #[serde(default)]
  pub taxed_base: Decimal,
  #[serde(default)]
  pub exempt_base: Decimal,
  #[serde(default)]
  pub unaffected_base: Decimal,
  #[serde(default)]
  pub export_base: Decimal,
  #[serde(default)]
  pub tax: Decimal,
  #[serde(default)]
  pub discount: Decimal,
  pub total: Decimal,
}

impl BackendTotals {
  /// True when the server recomputed a different total than the form showed.
  pub fn differs_from(&self, provisional: &Totals) -> bool {
    self.total != provisional.total
  }
}

impl CreateInvoiceRequest {
  /// Validates the draft and converts it to the backend shape. Incomplete
  /// rows are dropped; installments are attached only for credit sales.
  pub fn from_draft(
    draft: &InvoiceDraft,
    default_credit_days: u32,
  ) -> Result<Self, ValidationErrors> {
    validate_draft(draft)?;

    let mut errors = ValidationErrors::new();
    let series = Series::new(&draft.series).map_err(|e| {
      errors.add("series", e.to_string());
    });
    let currency = Currency::from_str(&draft.currency).map_err(|e| {
      errors.add("currency", e.to_string());
    });
    let document_type = DocumentType::from_str(&draft.customer.document_type).map_err(|e| {
      errors.add("customer.document_type", e.to_string());
    });
    let (Ok(series), Ok(currency), Ok(document_type)) = (series, currency, document_type) else {
      return Err(errors);
    };

    let due_date = calculator::derive_due_date_with_default(
      draft.issue_date,
      &draft.payment_condition,
      default_credit_days,
    );

    let installments = if PaymentCondition::parse(&draft.payment_condition).is_credit() {
      let totals = calculator::compute_totals(draft);
      calculator::generate_installments(draft.installment_count, totals.total, Some(due_date))
        .into_iter()
        .map(|installment| InstallmentPayload {
          number: installment.number,
          amount: installment.amount,
          due_date: installment.due_date,
        })
        .collect()
    } else {
      Vec::new()
    };

    let customer = &draft.customer;

    Ok(Self {
      series,
      number: draft.number,
      issue_date: draft.issue_date,
      due_date,
      customer: CustomerPayload {
        document_type,
        document_number: customer.document_number.trim().to_string(),
        legal_name: customer.legal_name.trim().to_string(),
        address: customer.address.trim().to_string(),
        email: non_blank(customer.email.as_deref()),
        phone: non_blank(customer.phone.as_deref()),
      },
      line_items: draft
        .billable_items()
        .map(|item| LineItemPayload {
          code: item.code.trim().to_string(),
          description: item.description.trim().to_string(),
          quantity: item.quantity,
          unit_measure: item.unit_measure.trim().to_string(),
          unit_price: item.unit_price,
          tax_affectation_type: item.tax_affectation,
          discount: item.discount.filter(|d| !d.is_zero()),
        })
        .collect(),
      currency,
      payment_method: draft.payment_method.trim().to_string(),
      payment_condition: draft.payment_condition.trim().to_string(),
      installments,
      global_discount_percent: draft.global_discount_percent,
    })
  }
}

fn non_blank(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}
