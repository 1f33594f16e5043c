//! User-visible report labels.

use serde::{Deserialize, Serialize};

/// Column headers, notices and captions. Every field has a default so a
/// partial `[report.labels]` table is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLabels {
    pub last_name: String,
    pub first_name: String,
    pub id_number: String,
    pub group: String,
    pub date_received: String,
    pub grade: String,
    pub code: String,
    pub awarded_to: String,
    pub sheet_name: String,
    pub heading: String,
    pub no_issues: String,
    pub download_ods: String,
    pub download_xls: String,
    pub download_txt: String,
    pub download_zip: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            last_name: "Last name".to_string(),
            first_name: "First name".to_string(),
            id_number: "ID number".to_string(),
            group: "Group".to_string(),
            date_received: "Date received".to_string(),
            grade: "Grade".to_string(),
            code: "Code".to_string(),
            awarded_to: "Awarded to".to_string(),
            sheet_name: "Report".to_string(),
            heading: "Issued certificates".to_string(),
            no_issues: "There are no issued certificates".to_string(),
            download_ods: "Download in ODS format".to_string(),
            download_xls: "Download in Excel format".to_string(),
            download_txt: "Download in text format".to_string(),
            download_zip: "Download all certificates in a ZIP file".to_string(),
        }
    }
}

impl ReportLabels {
    /// Header row shared by every tabular export.
    pub fn export_header(&self) -> [&str; 7] {
        [
            &self.last_name,
            &self.first_name,
            &self.id_number,
            &self.group,
            &self.date_received,
            &self.grade,
            &self.code,
        ]
    }

    /// Columns of the on-screen table.
    pub fn table_columns(&self) -> Vec<String> {
        vec![
            self.awarded_to.clone(),
            self.date_received.clone(),
            self.grade.clone(),
            self.code.clone(),
        ]
    }
}
