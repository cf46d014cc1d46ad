//! Report request and response bodies.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use neas_core::types::RecordId;

/// Body sent to the document-generation service: the master summary record
/// and the two versions to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Record the report is generated for.
    pub id: RecordId,
    /// First version number.
    pub version1: u32,
    /// Second version number.
    pub version2: u32,
}

impl ReportRequest {
    /// Suggested file name for the generated document.
    pub fn file_name(&self) -> String {
        format!("report-{}-v{}-v{}.pdf", self.id, self.version1, self.version2)
    }
}

/// JSON error body returned by the document service on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportErrorBody {
    /// Error description.
    pub error: String,
}

/// A generated document.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    /// MIME type reported by the service.
    pub content_type: String,
    /// Raw document bytes.
    pub bytes: Bytes,
}
