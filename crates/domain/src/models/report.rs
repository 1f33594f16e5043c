//! View models returned when no export is requested.

use serde::Serialize;

/// Active date filter, echoed back so the filter form can be refilled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DateFilterView {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// One export button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub format: String,
    pub label: String,
    pub url: String,
}

/// Link to one issued PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLink {
    pub file_id: i64,
    pub name: String,
    pub size: i64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRowView {
    pub issue_id: i64,
    pub user_id: i64,
    pub recipient: String,
    pub date: String,
    pub files: Vec<FileLink>,
    pub grade: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// The paginated issue table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    pub certificate_id: i64,
    pub certificate_name: String,
    pub heading: String,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRowView>,
    pub pagination: PaginationView,
    pub downloads: Vec<DownloadLink>,
    pub filter: DateFilterView,
}

/// Shown instead of the table (and instead of any export) when nothing matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyReportView {
    pub certificate_id: i64,
    pub certificate_name: String,
    pub heading: String,
    pub notice: String,
    pub filter: DateFilterView,
}
