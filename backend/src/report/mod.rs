pub mod document;
pub mod pdf;

pub use document::{ReportDocument, TIMESTAMP_FORMAT};
pub use pdf::{ReportError, ReportGenerator, REPORT_FILENAME};
