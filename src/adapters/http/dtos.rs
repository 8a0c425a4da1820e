use serde::Serialize;

/// Error response for API errors
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional detailed error information
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

/// Response of the liveness check
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
  pub status: String,
  pub version: String,
}

impl HealthResponse {
  pub fn ok() -> Self {
    Self {
      status: "ok".to_string(),
      version: env!("CARGO_PKG_VERSION").to_string(),
    }
  }
}
