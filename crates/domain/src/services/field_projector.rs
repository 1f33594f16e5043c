//! Maps issue records to the flat export row.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::grade::{GradeResolver, GradebookResolver};
use crate::models::{CertificateContext, IssueRecord, ProjectedRow};

/// Default issue date format, e.g. `15 January 2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%-d %B %Y";

/// Placeholder for a missing ID number. Keeps text columns aligned.
pub const EMPTY_ID_NUMBER: &str = " ";

/// Projects records of one certificate.
#[derive(Clone)]
pub struct FieldProjector {
    certificate: CertificateContext,
    grades: Arc<dyn GradeResolver>,
    date_format: String,
}

impl FieldProjector {
    /// The date format must already be validated; chrono panics on a bad one.
    pub fn new(certificate: CertificateContext, date_format: impl Into<String>) -> Self {
        Self {
            certificate,
            grades: Arc::new(GradebookResolver),
            date_format: date_format.into(),
        }
    }

    pub fn with_resolver(mut self, grades: Arc<dyn GradeResolver>) -> Self {
        self.grades = grades;
        self
    }

    pub fn certificate(&self) -> &CertificateContext {
        &self.certificate
    }

    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.format(&self.date_format).to_string()
    }

    pub fn grade(&self, record: &IssueRecord) -> String {
        self.grades.resolve(&self.certificate, record.grade.as_ref())
    }

    pub fn project(&self, record: &IssueRecord) -> ProjectedRow {
        let id_number = match record.id_number.as_deref() {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => EMPTY_ID_NUMBER.to_string(),
        };

        ProjectedRow {
            last_name: record.last_name.clone(),
            first_name: record.first_name.clone(),
            id_number,
            // Group names are joined without a separator; downstream
            // consumers rely on this exact layout.
            groups: record.group_names.concat(),
            issue_date: self.format_date(record.issued_at),
            grade: self.grade(record),
            code: record.code.clone(),
        }
    }

    /// Lazily projects a record slice in order.
    pub fn project_all<'a>(
        &'a self,
        records: &'a [IssueRecord],
    ) -> impl Iterator<Item = ProjectedRow> + 'a {
        records.iter().map(move |record| self.project(record))
    }
}

impl std::fmt::Debug for FieldProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldProjector")
            .field("certificate_id", &self.certificate.certificate_id)
            .field("date_format", &self.date_format)
            .finish()
    }
}
