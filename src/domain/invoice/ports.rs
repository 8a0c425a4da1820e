use async_trait::async_trait;

use super::errors::InvoiceError;
use super::submission::{CreateInvoiceRequest, InvoiceSubmission};

/// Invoicing backend that stores invoices and forwards them to SUNAT.
#[async_trait]
pub trait InvoiceApi: Send + Sync {
  async fn create_invoice(
    &self,
    session_token: &str,
    request: &CreateInvoiceRequest,
  ) -> Result<InvoiceSubmission, InvoiceError>;
}
