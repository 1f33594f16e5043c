//! References to issued certificate files held in external storage.

use serde::Serialize;
use shared::filename::sanitize_filename;

use super::{CertificateContext, IssueRecord};

/// Lookup handle for one stored file. The content itself stays in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRef {
    pub file_id: i64,
    pub issue_id: i64,
    pub certificate_id: i64,
    pub file_name: String,
    pub file_size: i64,
}

impl AttachmentRef {
    /// Zero-byte files were never actually generated.
    pub fn is_generated(&self) -> bool {
        self.file_size > 0
    }
}

/// Download name of a user's certificate PDF:
/// `{first} {last}_{course}_{certificate}.pdf`, sanitized.
pub fn display_file_name(record: &IssueRecord, certificate: &CertificateContext) -> String {
    let stem = sanitize_filename(&format!(
        "{}_{}_{}",
        record.full_name(),
        certificate.course_short_name,
        certificate.name
    ));
    format!("{}.pdf", stem)
}
