pub mod draft_command;
pub mod lenient;
pub mod preview_invoice;
pub mod submit_invoice;

pub use draft_command::{
  CustomerCommand, InvoiceDraftCommand, InvoicingDefaults, LineItemCommand,
};
pub use preview_invoice::{PreviewInvoiceResponse, PreviewInvoiceUseCase};
pub use submit_invoice::{SubmitInvoiceResponse, SubmitInvoiceUseCase};
