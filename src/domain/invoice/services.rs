use std::sync::Arc;

use super::calculator;
use super::entities::{InvoiceDraft, InvoicePreview};
use super::errors::InvoiceError;
use super::form::InvoiceForm;
use super::ports::InvoiceApi;
use super::submission::{CreateInvoiceRequest, InvoiceSubmission};
use super::value_objects::DEFAULT_CREDIT_DAYS;

pub struct InvoiceService {
  api: Arc<dyn InvoiceApi>,
  default_credit_days: u32,
}

impl InvoiceService {
  pub fn new(api: Arc<dyn InvoiceApi>) -> Self {
    Self::with_default_credit_days(api, DEFAULT_CREDIT_DAYS)
  }

  pub fn with_default_credit_days(api: Arc<dyn InvoiceApi>, default_credit_days: u32) -> Self {
    Self {
      api,
      default_credit_days,
    }
  }

  pub fn default_credit_days(&self) -> u32 {
    self.default_credit_days
  }

  pub fn preview(&self, draft: &InvoiceDraft) -> InvoicePreview {
    let preview = calculator::preview_with_default(draft, self.default_credit_days);
    tracing::debug!(
      items = draft.line_items.len(),
      total = %preview.totals.total,
      installments = preview.installments.len(),
      "Recomputed invoice preview"
    );
    preview
  }

  /// Validates the draft and posts it to the backend. Never retries; the
  /// caller decides whether to submit again.
  pub async fn submit(
    &self,
    session_token: &str,
    draft: &InvoiceDraft,
  ) -> Result<InvoiceSubmission, InvoiceError> {
    if session_token.trim().is_empty() {
      return Err(InvoiceError::Unauthorized);
    }

    let request = CreateInvoiceRequest::from_draft(draft, self.default_credit_days)
      .inspect_err(|errors| {
        tracing::warn!(fields = errors.len(), "Invoice draft failed validation: {}", errors);
      })?;

    let provisional = calculator::compute_totals(draft);
    tracing::info!(
      series = %request.series,
      items = request.line_items.len(),
      installments = request.installments.len(),
      total = %provisional.total,
      "Submitting invoice"
    );

    let submission = self
      .api
      .create_invoice(session_token, &request)
      .await
      .inspect_err(|e| tracing::error!("Invoice submission failed: {}", e))?;

    if let Some(totals) = &submission.totals {
      if totals.differs_from(&provisional) {
        tracing::warn!(
          provisional = %provisional.total,
          authoritative = %totals.total,
          "Backend total differs from the form total"
        );
      }
    }

    tracing::info!(
      id = %submission.id,
      series = %submission.series,
      number = submission.number,
      status = %submission.status,
      "Invoice accepted"
    );

    Ok(submission)
  }

  /// Submits the form's draft and resets the form on success. On failure the
  /// draft is left untouched so it can be sent again.
  pub async fn submit_form(
    &self,
    session_token: &str,
    form: &mut InvoiceForm,
  ) -> Result<InvoiceSubmission, InvoiceError> {
    let submission = self.submit(session_token, form.draft()).await?;
    form.reset();
    Ok(submission)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::domain::invoice::entities::{Customer, LineItem};
  use crate::domain::invoice::value_objects::TaxAffectationType;
  use async_trait::async_trait;
  use chrono::NaiveDate;
  use rust_decimal_macros::dec;
  use std::sync::Mutex;

  /// Records requests and answers with a canned result.
  pub(crate) struct FakeInvoiceApi {
    pub requests: Mutex<Vec<(String, CreateInvoiceRequest)>>,
    fail_with_status: Option<u16>,
  }

  impl FakeInvoiceApi {
    pub fn accepting() -> Self {
      Self {
        requests: Mutex::new(Vec::new()),
        fail_with_status: None,
      }
    }

    pub fn failing(status: u16) -> Self {
      Self {
        requests: Mutex::new(Vec::new()),
        fail_with_status: Some(status),
      }
    }

    pub fn request_count(&self) -> usize {
      self.requests.lock().unwrap().len()
    }
  }

  #[async_trait]
  impl InvoiceApi for FakeInvoiceApi {
    async fn create_invoice(
      &self,
      session_token: &str,
      request: &CreateInvoiceRequest,
    ) -> Result<InvoiceSubmission, InvoiceError> {
      self
        .requests
        .lock()
        .unwrap()
        .push((session_token.to_string(), request.clone()));

      match self.fail_with_status {
        Some(status) => Err(InvoiceError::BackendRejected {
          status,
          message: "rejected by fake".to_string(),
        }),
        None => Ok(InvoiceSubmission {
          id: "inv-1".to_string(),
          series: request.series.value().to_string(),
          number: request.number.unwrap_or(1),
          status: "PENDING".to_string(),
          totals: None,
        }),
      }
    }
  }

  pub(crate) fn filled_form() -> InvoiceForm {
    let mut form = InvoiceForm::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    let draft = form.draft_mut();
    draft.series = "F001".to_string();
    draft.payment_method = "Transferencia".to_string();
    draft.customer = Customer {
      document_type: "6".to_string(),
      document_number: "20100070970".to_string(),
      legal_name: "Comercial Andina S.A.C.".to_string(),
      address: "Av. Arequipa 123, Lima".to_string(),
      email: None,
      phone: None,
    };
    draft.line_items = vec![
      LineItem::new(dec!(1), dec!(100), TaxAffectationType::Taxed)
        .with_description("P001", "Laptop"),
    ];
    form
  }

  #[tokio::test]
  async fn test_submit_form_resets_on_success() {
    let api = Arc::new(FakeInvoiceApi::accepting());
    let service = InvoiceService::new(api.clone());
    let mut form = filled_form();

    let submission = service.submit_form("token-123", &mut form).await.unwrap();

    assert_eq!(submission.series, "F001");
    assert_eq!(api.request_count(), 1);
    assert_eq!(api.requests.lock().unwrap()[0].0, "token-123");
    assert!(form.draft().line_items[0].is_blank());
    assert!(form.draft().series.is_empty());
  }

  #[tokio::test]
  async fn test_submit_form_keeps_draft_on_backend_error() {
    let api = Arc::new(FakeInvoiceApi::failing(502));
    let service = InvoiceService::new(api.clone());
    let mut form = filled_form();
    let before = form.draft().clone();

    let result = service.submit_form("token-123", &mut form).await;

    assert!(matches!(
      result,
      Err(InvoiceError::BackendRejected { status: 502, .. })
    ));
    assert_eq!(form.draft(), &before);
  }

  #[tokio::test]
  async fn test_invalid_draft_is_not_sent() {
    let api = Arc::new(FakeInvoiceApi::accepting());
    let service = InvoiceService::new(api.clone());
    let mut form = filled_form();
    form.draft_mut().customer.legal_name.clear();

    let result = service.submit_form("token-123", &mut form).await;

    match result {
      Err(InvoiceError::Validation(errors)) => assert!(errors.contains("customer.legal_name")),
      other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(api.request_count(), 0);
  }

  #[tokio::test]
  async fn test_missing_token_is_unauthorized() {
    let api = Arc::new(FakeInvoiceApi::accepting());
    let service = InvoiceService::new(api.clone());
    let form = filled_form();

    let result = service.submit(" ", form.draft()).await;

    assert!(matches!(result, Err(InvoiceError::Unauthorized)));
    assert_eq!(api.request_count(), 0);
  }

  #[tokio::test]
  async fn test_credit_submission_uses_configured_days() {
    let api = Arc::new(FakeInvoiceApi::accepting());
    let service = InvoiceService::with_default_credit_days(api.clone(), 60);
    let mut form = filled_form();
    form.draft_mut().payment_condition = "Credito".to_string();
    form.draft_mut().installment_count = 2;

    service.submit("token", form.draft()).await.unwrap();

    let requests = api.requests.lock().unwrap();
    let request = &requests[0].1;
    assert_eq!(request.due_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(request.installments.len(), 2);
    assert_eq!(request.installments[1].due_date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
  }

  #[test]
  fn test_preview_uses_configured_days() {
    let service = InvoiceService::with_default_credit_days(Arc::new(FakeInvoiceApi::accepting()), 10);
    let mut form = filled_form();
    form.draft_mut().payment_condition = "Credito".to_string();
    let preview = service.preview(form.draft());
    assert_eq!(preview.due_date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    assert_eq!(preview.totals.total, dec!(118.00));
  }
}
