use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

use super::draft_command::{InvoiceDraftCommand, InvoicingDefaults};
use crate::domain::invoice::{
  BackendTotals, InvoiceError, InvoiceService, Totals, compute_totals,
};

/// Response after the backend accepted an invoice
#[derive(Debug, Clone, Serialize)]
pub struct SubmitInvoiceResponse {
  pub invoice_id: String,
  pub series: String,
  pub number: u32,
  pub status: String,
  /// Totals shown in the form before submission
  pub provisional_totals: Totals,
  /// Totals computed by the backend, the system of record
  #[serde(skip_serializing_if = "Option::is_none")]
  pub totals: Option<BackendTotals>,
}

/// Use case for validating a draft and sending it to the invoicing backend
pub struct SubmitInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
  defaults: InvoicingDefaults,
}

impl SubmitInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>, defaults: InvoicingDefaults) -> Self {
    Self {
      invoice_service,
      defaults,
    }
  }

  pub async fn execute(
    &self,
    session_token: &str,
    command: InvoiceDraftCommand,
  ) -> Result<SubmitInvoiceResponse, InvoiceError> {
    self
      .execute_on(session_token, command, Local::now().date_naive())
      .await
  }

  pub async fn execute_on(
    &self,
    session_token: &str,
    command: InvoiceDraftCommand,
    today: NaiveDate,
  ) -> Result<SubmitInvoiceResponse, InvoiceError> {
    let draft = command.into_draft(&self.defaults, today);
    let provisional_totals = compute_totals(&draft);

    let submission = self.invoice_service.submit(session_token, &draft).await?;

    Ok(SubmitInvoiceResponse {
      invoice_id: submission.id,
      series: submission.series,
      number: submission.number,
      status: submission.status,
      provisional_totals,
      totals: submission.totals,
    })
  }
}
