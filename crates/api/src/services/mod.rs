//! Report services.

pub mod export;
pub mod report;

pub use report::{ReportError, ReportOutcome, ReportService, CERTIFICATE_ROUTES};
