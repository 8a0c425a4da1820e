use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::adapters::http::{
  dtos::HealthResponse, errors::ApiError, middleware::RequestIdExt,
};
use crate::application::invoice::{
  InvoiceDraftCommand, PreviewInvoiceUseCase, SubmitInvoiceUseCase,
};

/// Extract the session token from the Authorization header
fn extract_session_token(req: &HttpRequest) -> Result<String, ApiError> {
  req
    .headers()
    .get("Authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .ok_or(ApiError::Unauthorized)
}

/// Handler for recomputing a draft's totals
///
/// POST /api/invoices/preview
/// Request body: InvoiceDraftCommand (JSON)
/// Response: PreviewInvoiceResponse (JSON) with status 200
pub async fn preview_invoice_handler(
  use_case: web::Data<Arc<PreviewInvoiceUseCase>>,
  request: web::Json<InvoiceDraftCommand>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let response = use_case.execute(request.into_inner());

  Ok(HttpResponse::Ok().json(response))
}

/// Handler for submitting a draft to the invoicing backend
///
/// POST /api/invoices
/// Headers: Authorization: Bearer <token>
/// Request body: InvoiceDraftCommand (JSON)
/// Response: SubmitInvoiceResponse (JSON) with status 201
pub async fn submit_invoice_handler(
  use_case: web::Data<Arc<SubmitInvoiceUseCase>>,
  http_req: HttpRequest,
  request: web::Json<InvoiceDraftCommand>,
) -> Result<HttpResponse, ApiError> {
  let session_token = extract_session_token(&http_req)?;

  request.validate()?;

  if let Some(request_id) = http_req.request_id() {
    tracing::debug!(%request_id, "Invoice submission received");
  }

  let response = use_case
    .execute(&session_token, request.into_inner())
    .await?;

  Ok(HttpResponse::Created().json(response))
}

/// GET /health
pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::http::middleware::RequestIdMiddleware;
  use crate::adapters::http::routes::configure_invoice_routes;
  use crate::application::invoice::InvoicingDefaults;
  use crate::domain::invoice::InvoiceService;
  use crate::domain::invoice::services::tests::FakeInvoiceApi;
  use actix_web::{App, http::StatusCode, test};
  use serde_json::{Value, json};

  fn valid_draft() -> Value {
    json!({
      "series": "F001",
      "number": 7,
      "issue_date": "2024-01-01",
      "payment_method": "Transferencia",
      "payment_condition": "Contado",
      "customer": {
        "document_type": "6",
        "document_number": "20100070970",
        "legal_name": "Comercial Andina S.A.C.",
        "address": "Av. Arequipa 123, Lima"
      },
      "line_items": [
        {"code": "P001", "description": "Laptop", "quantity": "2", "unit_price": "50"}
      ]
    })
  }

  fn use_cases(api: Arc<FakeInvoiceApi>) -> (Arc<PreviewInvoiceUseCase>, Arc<SubmitInvoiceUseCase>) {
    let service = Arc::new(InvoiceService::new(api));
    (
      Arc::new(PreviewInvoiceUseCase::new(
        service.clone(),
        InvoicingDefaults::default(),
      )),
      Arc::new(SubmitInvoiceUseCase::new(service, InvoicingDefaults::default())),
    )
  }

  #[actix_web::test]
  async fn test_preview_returns_totals() {
    let (preview, submit) = use_cases(Arc::new(FakeInvoiceApi::accepting()));
    let app = test::init_service(
      App::new()
        .wrap(RequestIdMiddleware::new())
        .configure(|cfg| configure_invoice_routes(cfg, preview, submit)),
    )
    .await;

    let req = test::TestRequest::post()
      .uri("/api/invoices/preview")
      .set_json(valid_draft())
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totals"]["total"], "118.00");
    assert_eq!(body["totals"]["tax"], "18.00");
    assert_eq!(body["due_date"], "2024-01-01");
  }

  #[actix_web::test]
  async fn test_preview_survives_extreme_values() {
    let (preview, submit) = use_cases(Arc::new(FakeInvoiceApi::accepting()));
    let app = test::init_service(
      App::new().configure(|cfg| configure_invoice_routes(cfg, preview, submit)),
    )
    .await;

    let mut draft = valid_draft();
    draft["payment_condition"] = json!("Credito a 4000000000 dias");
    draft["installment_count"] = json!("4294967295");
    draft["line_items"] = json!([
      {"description": "Huge", "quantity": "100000000000000000000", "unit_price": "100000000000000000000"},
      {"description": "Odd rate", "quantity": "10000000000", "unit_price": "10000000000",
       "tax_rate_percent": "100000000000000000"},
      {"description": "Laptop", "quantity": "1", "unit_price": "100"}
    ]);
    let req = test::TestRequest::post()
      .uri("/api/invoices/preview")
      .set_json(draft)
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totals"]["total"], "118.00");
    assert!(body["lines"][0].is_null());
    assert!(body["lines"][1].is_null());
    assert_eq!(body["due_date"], "2024-01-31");
    assert_eq!(body["installments"].as_array().map(Vec::len), Some(60));
    assert_eq!(body["installments"][0]["amount"], "1.97");
    assert_eq!(body["installments"][59]["amount"], "1.77");
  }

  #[actix_web::test]
  async fn test_submit_requires_bearer_token() {
    let api = Arc::new(FakeInvoiceApi::accepting());
    let (preview, submit) = use_cases(api.clone());
    let app = test::init_service(
      App::new().configure(|cfg| configure_invoice_routes(cfg, preview, submit)),
    )
    .await;

    let req = test::TestRequest::post()
      .uri("/api/invoices")
      .set_json(valid_draft())
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(api.request_count(), 0);
  }

  #[actix_web::test]
  async fn test_submit_forwards_token_and_returns_created() {
    let api = Arc::new(FakeInvoiceApi::accepting());
    let (preview, submit) = use_cases(api.clone());
    let app = test::init_service(
      App::new().configure(|cfg| configure_invoice_routes(cfg, preview, submit)),
    )
    .await;

    let req = test::TestRequest::post()
      .uri("/api/invoices")
      .insert_header(("Authorization", "Bearer session-abc"))
      .set_json(valid_draft())
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["invoice_id"], "inv-1");
    assert_eq!(body["number"], 7);
    assert_eq!(api.requests.lock().unwrap()[0].0, "session-abc");
  }

  #[actix_web::test]
  async fn test_submit_invalid_draft_returns_field_errors() {
    let api = Arc::new(FakeInvoiceApi::accepting());
    let (preview, submit) = use_cases(api.clone());
    let app = test::init_service(
      App::new().configure(|cfg| configure_invoice_routes(cfg, preview, submit)),
    )
    .await;

    let mut draft = valid_draft();
    draft["customer"]["legal_name"] = json!("");
    let req = test::TestRequest::post()
      .uri("/api/invoices")
      .insert_header(("Authorization", "Bearer session-abc"))
      .set_json(draft)
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"]["customer.legal_name"].is_array());
    assert_eq!(api.request_count(), 0);
  }

  #[actix_web::test]
  async fn test_backend_failure_maps_to_bad_gateway() {
    let (preview, submit) = use_cases(Arc::new(FakeInvoiceApi::failing(503)));
    let app = test::init_service(
      App::new().configure(|cfg| configure_invoice_routes(cfg, preview, submit)),
    )
    .await;

    let req = test::TestRequest::post()
      .uri("/api/invoices")
      .insert_header(("Authorization", "Bearer session-abc"))
      .set_json(valid_draft())
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  }

  #[actix_web::test]
  async fn test_health() {
    let (preview, submit) = use_cases(Arc::new(FakeInvoiceApi::accepting()));
    let app = test::init_service(
      App::new().configure(|cfg| configure_invoice_routes(cfg, preview, submit)),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
  }
}
