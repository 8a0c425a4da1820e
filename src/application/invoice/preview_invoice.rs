use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

use super::draft_command::{InvoiceDraftCommand, InvoicingDefaults};
use crate::domain::invoice::{Installment, InvoiceService, LineBreakdown, Totals};

/// Response with everything the form renders after an edit
#[derive(Debug, Clone, Serialize)]
pub struct PreviewInvoiceResponse {
  pub lines: Vec<Option<LineBreakdown>>,
  pub totals: Totals,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub installments: Vec<Installment>,
}

/// Use case for recomputing totals of a draft without contacting the backend
pub struct PreviewInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
  defaults: InvoicingDefaults,
}

impl PreviewInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>, defaults: InvoicingDefaults) -> Self {
    Self {
      invoice_service,
      defaults,
    }
  }

  /// Never fails: half-typed payloads preview as whatever can be computed.
  pub fn execute(&self, command: InvoiceDraftCommand) -> PreviewInvoiceResponse {
    self.execute_on(command, Local::now().date_naive())
  }

  pub fn execute_on(&self, command: InvoiceDraftCommand, today: NaiveDate) -> PreviewInvoiceResponse {
    let draft = command.into_draft(&self.defaults, today);
    let preview = self.invoice_service.preview(&draft);

    PreviewInvoiceResponse {
      lines: preview.lines,
      totals: preview.totals,
      issue_date: draft.issue_date,
      due_date: preview.due_date,
      installments: preview.installments,
    }
  }
}
