//! Export request and artifact models.

use serde::Serialize;
use shared::pagination::PageWindow;

use super::{DateRange, IssueSort};

/// Output target of an export, selected by the `download` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Ods,
    Xls,
    Text,
    Archive,
}

impl ExportFormat {
    /// Maps a `download` value. `Ok(None)` means no export (the on-screen
    /// table); an unknown value is returned as the error.
    pub fn from_download_param(value: Option<&str>) -> Result<Option<Self>, String> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some("ods") => Ok(Some(ExportFormat::Ods)),
            Some("xls") => Ok(Some(ExportFormat::Xls)),
            Some("txt") => Ok(Some(ExportFormat::Text)),
            Some("zip") => Ok(Some(ExportFormat::Archive)),
            Some(other) => Err(other.to_string()),
        }
    }

    pub fn all() -> [ExportFormat; 4] {
        [
            ExportFormat::Ods,
            ExportFormat::Xls,
            ExportFormat::Text,
            ExportFormat::Archive,
        ]
    }

    /// Value of the `download` parameter selecting this format.
    pub fn download_param(&self) -> &'static str {
        match self {
            ExportFormat::Ods => "ods",
            ExportFormat::Xls => "xls",
            ExportFormat::Text => "txt",
            ExportFormat::Archive => "zip",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.download_param()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Ods => "application/vnd.oasis.opendocument.spreadsheet",
            ExportFormat::Xls => "application/vnd.ms-excel",
            ExportFormat::Text => "application/download",
            ExportFormat::Archive => "application/zip",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.download_param())
    }
}

/// An issue reduced to the seven exported columns, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedRow {
    pub last_name: String,
    pub first_name: String,
    pub id_number: String,
    pub groups: String,
    pub issue_date: String,
    pub grade: String,
    pub code: String,
}

impl ProjectedRow {
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.last_name,
            &self.first_name,
            &self.id_number,
            &self.groups,
            &self.issue_date,
            &self.grade,
            &self.code,
        ]
    }
}

/// Parameters of one report or export invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub certificate_id: i64,
    /// `None` renders the on-screen table.
    pub format: Option<ExportFormat>,
    pub sort: IssueSort,
    pub date_range: DateRange,
    pub window: PageWindow,
    /// Group chosen in the group selector, if any.
    pub selected_group: Option<i64>,
}

impl ExportRequest {
    pub fn is_export(&self) -> bool {
        self.format.is_some()
    }

    /// Exports always read the full filtered set.
    pub fn effective_window(&self) -> PageWindow {
        if self.is_export() {
            PageWindow::unpaged()
        } else {
            self.window
        }
    }
}

/// A finished export, ready to be sent and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub filename: String,
    pub body: Vec<u8>,
}

impl ExportArtifact {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
