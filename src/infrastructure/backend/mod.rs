mod http_invoice_api;

pub use http_invoice_api::HttpInvoiceApi;
