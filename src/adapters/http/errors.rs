use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;

use crate::domain::invoice::{InvoiceError, ValidationErrors};

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Malformed request (400 Bad Request)
  Validation(String),

  /// Draft failed field validation (400 Bad Request, with per-field messages)
  FieldValidation(ValidationErrors),

  /// Missing or refused session token (401 Unauthorized)
  Unauthorized,

  /// Backend refused the invoice on business grounds (422 Unprocessable Entity)
  Rejected(String),

  /// Backend unreachable or failing (502 Bad Gateway)
  Backend(String),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::FieldValidation(errors) => write!(f, "Validation error: {}", errors),
      ApiError::Unauthorized => write!(f, "Unauthorized"),
      ApiError::Rejected(msg) => write!(f, "Rejected by backend: {}", msg),
      ApiError::Backend(msg) => write!(f, "Backend error: {}", msg),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) | ApiError::FieldValidation(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error_type, message, details) = match self {
      ApiError::Validation(msg) => ("validation_error", msg.clone(), None),
      ApiError::FieldValidation(errors) => (
        "validation_error",
        "The invoice has invalid fields".to_string(),
        serde_json::to_value(errors).ok(),
      ),
      ApiError::Unauthorized => (
        "unauthorized",
        "Invalid or missing authorization token".to_string(),
        None,
      ),
      ApiError::Rejected(msg) => ("backend_rejected", msg.clone(), None),
      ApiError::Backend(msg) => {
        tracing::error!("Backend error: {}", msg);
        (
          "backend_unavailable",
          "The invoicing service is unavailable, please try again".to_string(),
          None,
        )
      }
      ApiError::Internal(msg) => {
        // Don't expose internal error details
        tracing::error!("Internal error: {}", msg);
        (
          "internal_error",
          "An internal server error occurred".to_string(),
          None,
        )
      }
    };

    let error_response = ErrorResponse {
      error: error_type.to_string(),
      message,
      details,
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(error_response)
  }
}

/// Convert InvoiceError to ApiError
impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::Validation(errors) => ApiError::FieldValidation(errors),
      InvoiceError::Unauthorized => ApiError::Unauthorized,
      InvoiceError::BackendRejected { status, message } if status < 500 => {
        ApiError::Rejected(message)
      }
      InvoiceError::BackendRejected { status, message } => {
        ApiError::Backend(format!("status {}: {}", status, message))
      }
      InvoiceError::BackendUnavailable(msg) => ApiError::Backend(msg),
      InvoiceError::InvalidResponse(msg) => ApiError::Backend(msg),
      InvoiceError::Internal(msg) => ApiError::Internal(msg),
    }
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let messages: Vec<String> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errors)| {
        errors
          .iter()
          .map(|error| {
            error
              .message
              .as_ref()
              .map(|m| m.to_string())
              .unwrap_or_else(|| format!("Invalid field: {}", field))
          })
          .collect::<Vec<_>>()
      })
      .collect();

    if messages.is_empty() {
      // Only nested structs failed; their flattened paths are in Display
      return ApiError::Validation(errors.to_string());
    }

    ApiError::Validation(messages.join(", "))
  }
}
