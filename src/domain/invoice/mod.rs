pub mod calculator;
pub mod entities;
pub mod errors;
pub mod form;
pub mod ports;
pub mod services;
pub mod submission;
pub mod validation;
pub mod value_objects;

pub use calculator::{
  compute_line, compute_totals, derive_due_date, generate_installments, preview, round_money,
};
pub use entities::{
  Customer, Installment, InvoiceDraft, InvoicePreview, LineBreakdown, LineItem, Totals,
};
pub use errors::InvoiceError;
pub use form::InvoiceForm;
pub use ports::InvoiceApi;
pub use services::InvoiceService;
pub use submission::{
  BackendTotals, CreateInvoiceRequest, CustomerPayload, InstallmentPayload, InvoiceSubmission,
  LineItemPayload,
};
pub use validation::{ValidationErrors, validate_draft};
pub use value_objects::{
  Currency, DocumentType, PaymentCondition, Series, TaxAffectationType, ValueObjectError,
};
