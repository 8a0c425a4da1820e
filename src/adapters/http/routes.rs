use actix_web::web;
use std::sync::Arc;

use crate::application::invoice::{PreviewInvoiceUseCase, SubmitInvoiceUseCase};

use super::handlers::invoices::{health_handler, preview_invoice_handler, submit_invoice_handler};

/// Configure invoice routes
///
/// # Routes
///
/// - POST /api/invoices/preview - Recompute totals, due date and installments
/// - POST /api/invoices - Validate a draft and send it to the invoicing backend
/// - GET /health - Liveness check
///
/// # Example
///
/// ```no_run
/// use actix_web::App;
/// use std::sync::Arc;
/// # use facturape::application::invoice::*;
/// # use facturape::adapters::http::routes::configure_invoice_routes;
///
/// # fn example(preview: Arc<PreviewInvoiceUseCase>, submit: Arc<SubmitInvoiceUseCase>) {
/// let app = App::new().configure(|cfg| configure_invoice_routes(cfg, preview, submit));
/// # }
/// ```
pub fn configure_invoice_routes(
  cfg: &mut web::ServiceConfig,
  preview_use_case: Arc<PreviewInvoiceUseCase>,
  submit_use_case: Arc<SubmitInvoiceUseCase>,
) {
  cfg
    .app_data(web::Data::new(preview_use_case))
    .app_data(web::Data::new(submit_use_case))
    .route("/health", web::get().to(health_handler))
    .service(
      web::scope("/api/invoices")
        .route("", web::post().to(submit_invoice_handler))
        .route("/preview", web::post().to(preview_invoice_handler)),
    );
}
