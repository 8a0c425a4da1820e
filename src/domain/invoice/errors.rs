use super::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValidationErrors),

  #[error("Missing or invalid session token")]
  Unauthorized,

  #[error("Backend rejected the invoice ({status}): {message}")]
  BackendRejected { status: u16, message: String },

  #[error("Backend unavailable: {0}")]
  BackendUnavailable(String),

  #[error("Unexpected backend response: {0}")]
  InvalidResponse(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl InvoiceError {
  /// Whether re-submitting the same draft could succeed.
  pub fn is_retryable(&self) -> bool {
    match self {
      InvoiceError::BackendUnavailable(_) => true,
      InvoiceError::BackendRejected { status, .. } => *status >= 500,
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_retryable_errors() {
    assert!(InvoiceError::BackendUnavailable("timeout".to_string()).is_retryable());
    assert!(
      InvoiceError::BackendRejected {
        status: 503,
        message: "maintenance".to_string()
      }
      .is_retryable()
    );
    assert!(
      !InvoiceError::BackendRejected {
        status: 422,
        message: "duplicate".to_string()
      }
      .is_retryable()
    );
    assert!(!InvoiceError::Unauthorized.is_retryable());
  }
}
