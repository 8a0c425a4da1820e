use actix_web::{App, HttpServer, middleware::Logger};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facturape::{
  adapters::http::{RequestIdMiddleware, configure_invoice_routes},
  application::invoice::{PreviewInvoiceUseCase, SubmitInvoiceUseCase},
  domain::invoice::InvoiceService,
  infrastructure::{backend::HttpInvoiceApi, config::Config},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "facturape=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting FacturaPE application");

  let config = Config::load().map_err(|e| {
    tracing::error!("Failed to load configuration: {}", e);
    std::io::Error::new(
      std::io::ErrorKind::InvalidInput,
      format!("Invalid configuration: {}", e),
    )
  })?;
  tracing::info!("Configuration loaded successfully");

  tracing::info!(
    "Invoicing backend: {} (timeout {}s)",
    config.backend.base_url,
    config.backend.timeout_seconds
  );
  let invoice_api = HttpInvoiceApi::new(
    &config.backend.base_url,
    Duration::from_secs(config.backend.timeout_seconds),
  )
  .map_err(|e| std::io::Error::other(e.to_string()))?;

  let defaults = config.invoicing_defaults();
  let invoice_service = Arc::new(InvoiceService::with_default_credit_days(
    Arc::new(invoice_api),
    defaults.credit_days,
  ));

  let preview_use_case = Arc::new(PreviewInvoiceUseCase::new(
    invoice_service.clone(),
    defaults.clone(),
  ));
  let submit_use_case = Arc::new(SubmitInvoiceUseCase::new(invoice_service, defaults));

  let server_host = config.server.host.clone();
  let server_port = config.server.port;
  tracing::info!("Starting HTTP server at {}:{}", server_host, server_port);

  HttpServer::new(move || {
    App::new()
      // Add request ID middleware
      .wrap(RequestIdMiddleware::new())
      // Add logging middleware
      .wrap(Logger::default())
      .configure(|cfg| {
        configure_invoice_routes(cfg, preview_use_case.clone(), submit_use_case.clone())
      })
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await
}
