//! Domain models for certificate reports.

pub mod attachment;
pub mod certificate;
pub mod export;
pub mod issue;
pub mod labels;
pub mod report;

pub use attachment::{display_file_name, AttachmentRef};
pub use certificate::{CertificateContext, GradeDisplay, GroupMode};
pub use export::{ExportArtifact, ExportFormat, ExportRequest, ProjectedRow};
pub use issue::{
    CourseGrade, DateRange, GroupScope, IssueFilter, IssueRecord, IssueSnapshot, IssueSort,
    SortDirection, SortField,
};
pub use labels::ReportLabels;
pub use report::{
    DateFilterView, DownloadLink, EmptyReportView, FileLink, PaginationView, ReportRowView,
    ReportView,
};
