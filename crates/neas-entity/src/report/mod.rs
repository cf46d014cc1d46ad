//! Report generation entities.

pub mod request;

pub use request::{ReportDocument, ReportErrorBody, ReportRequest};
