pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use dtos::{ErrorResponse, HealthResponse};
pub use errors::ApiError;
pub use handlers::invoices::{health_handler, preview_invoice_handler, submit_invoice_handler};
pub use middleware::{RequestId, RequestIdExt, RequestIdMiddleware};
pub use routes::configure_invoice_routes;
