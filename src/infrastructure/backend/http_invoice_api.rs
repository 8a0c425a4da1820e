use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::InvoiceApi;
use crate::domain::invoice::submission::{CreateInvoiceRequest, InvoiceSubmission};

/// Error body returned by the backend on rejected requests
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  error: Option<String>,
}

/// REST client for the invoicing backend
pub struct HttpInvoiceApi {
  client: Client,
  base_url: String,
}

impl HttpInvoiceApi {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InvoiceError> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| InvoiceError::Internal(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn invoices_url(&self) -> String {
    format!("{}/invoices", self.base_url)
  }
}

/// Picks the most useful message out of an error response body.
fn rejection_message(body: &str) -> String {
  match serde_json::from_str::<BackendErrorBody>(body) {
    Ok(BackendErrorBody {
      message: Some(message),
      ..
    }) => message,
    Ok(BackendErrorBody {
      error: Some(error), ..
    }) => error,
    _ if body.trim().is_empty() => "No response body".to_string(),
    _ => body.trim().to_string(),
  }
}

#[async_trait]
impl InvoiceApi for HttpInvoiceApi {
  async fn create_invoice(
    &self,
    session_token: &str,
    request: &CreateInvoiceRequest,
  ) -> Result<InvoiceSubmission, InvoiceError> {
    let url = self.invoices_url();
    tracing::debug!("POST {}", url);

    let response = self
      .client
      .post(&url)
      .bearer_auth(session_token)
      .json(request)
      .send()
      .await
      .map_err(|e| {
        tracing::error!("Failed to reach invoicing backend at {}: {}", url, e);
        InvoiceError::BackendUnavailable(e.to_string())
      })?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      tracing::warn!("Invoicing backend refused the session token ({})", status);
      return Err(InvoiceError::Unauthorized);
    }

    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let message = rejection_message(&body);
      tracing::warn!("Invoicing backend rejected invoice ({}): {}", status, message);
      return Err(InvoiceError::BackendRejected {
        status: status.as_u16(),
        message,
      });
    }

    response.json::<InvoiceSubmission>().await.map_err(|e| {
      tracing::error!("Failed to parse invoicing backend response: {}", e);
      InvoiceError::InvalidResponse(e.to_string())
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invoices_url_trims_trailing_slash() {
    let api = HttpInvoiceApi::new("http://localhost:3000/api/", Duration::from_secs(5)).unwrap();
    assert_eq!(api.invoices_url(), "http://localhost:3000/api/invoices");
  }

  #[test]
  fn test_rejection_message() {
    assert_eq!(
      rejection_message(r#"{"message": "Serie no autorizada"}"#),
      "Serie no autorizada"
    );
    assert_eq!(rejection_message(r#"{"error": "duplicate"}"#), "duplicate");
    assert_eq!(rejection_message("Bad Gateway\n"), "Bad Gateway");
    assert_eq!(rejection_message(""), "No response body");
  }

  #[tokio::test]
  async fn test_unreachable_backend_is_reported() {
    use crate::domain::invoice::{Currency, CustomerPayload, DocumentType, Series};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    // Port 9 (discard) on localhost is not expected to accept HTTP
    let api = HttpInvoiceApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let request = CreateInvoiceRequest {
      series: Series::new("F001").unwrap(),
      number: None,
      issue_date: date,
      due_date: date,
      customer: CustomerPayload {
        document_type: DocumentType::Ruc,
        document_number: "20100070970".to_string(),
        legal_name: "Comercial Andina S.A.C.".to_string(),
        address: "Lima".to_string(),
        email: None,
        phone: None,
      },
      line_items: Vec::new(),
      currency: Currency::PEN,
      payment_method: "Efectivo".to_string(),
      payment_condition: "Contado".to_string(),
      installments: Vec::new(),
      global_discount_percent: Decimal::ZERO,
    };

    let result = api.create_invoice("token", &request).await;

    assert!(matches!(result, Err(InvoiceError::BackendUnavailable(_))));
  }
}
