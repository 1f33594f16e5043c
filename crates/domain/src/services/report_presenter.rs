//! Builds the on-screen report from a page of records.

use shared::pagination::PageWindow;
use shared::validation::REPORT_DATE_FORMAT;
use std::collections::HashMap;

use super::field_projector::FieldProjector;
use crate::models::{
    AttachmentRef, DateFilterView, DateRange, DownloadLink, EmptyReportView, ExportFormat,
    FileLink, IssueSnapshot, PaginationView, ReportLabels, ReportRowView, ReportView,
};

/// Pure view transform; performs no I/O.
pub struct ReportPresenter<'a> {
    projector: &'a FieldProjector,
    labels: &'a ReportLabels,
    /// Prefix of the certificate routes, e.g. `/api/v1/certificates`.
    base_path: &'a str,
}

impl<'a> ReportPresenter<'a> {
    pub fn new(projector: &'a FieldProjector, labels: &'a ReportLabels, base_path: &'a str) -> Self {
        Self {
            projector,
            labels,
            base_path,
        }
    }

    pub fn render(
        &self,
        snapshot: &IssueSnapshot,
        files: &[AttachmentRef],
        window: PageWindow,
        date_range: &DateRange,
    ) -> ReportView {
        let certificate = self.projector.certificate();

        let mut files_by_issue: HashMap<i64, Vec<&AttachmentRef>> = HashMap::new();
        for file in files.iter().filter(|f| f.is_generated()) {
            files_by_issue.entry(file.issue_id).or_default().push(file);
        }

        let rows = snapshot
            .records
            .iter()
            .map(|record| ReportRowView {
                issue_id: record.issue_id,
                user_id: record.user_id,
                recipient: record.full_name(),
                date: self.projector.format_date(record.issued_at),
                files: files_by_issue
                    .get(&record.issue_id)
                    .map(|files| files.iter().map(|f| self.file_link(f)).collect())
                    .unwrap_or_default(),
                grade: self.projector.grade(record),
                code: record.code.clone(),
            })
            .collect();

        ReportView {
            certificate_id: certificate.certificate_id,
            certificate_name: certificate.name.clone(),
            heading: self.labels.heading.clone(),
            columns: self.labels.table_columns(),
            rows,
            pagination: pagination(snapshot.total, window),
            downloads: self.download_links(date_range),
            filter: filter_view(date_range),
        }
    }

    pub fn render_empty(&self, date_range: &DateRange) -> EmptyReportView {
        let certificate = self.projector.certificate();
        EmptyReportView {
            certificate_id: certificate.certificate_id,
            certificate_name: certificate.name.clone(),
            heading: self.labels.heading.clone(),
            notice: self.labels.no_issues.clone(),
            filter: filter_view(date_range),
        }
    }

    fn file_link(&self, file: &AttachmentRef) -> FileLink {
        FileLink {
            file_id: file.file_id,
            name: file.file_name.clone(),
            size: file.file_size,
            url: format!(
                "{}/{}/files/{}",
                self.base_path, file.certificate_id, file.file_id
            ),
        }
    }

    fn download_links(&self, date_range: &DateRange) -> Vec<DownloadLink> {
        let certificate_id = self.projector.certificate().certificate_id;
        let mut range_query = String::new();
        if let Some(start) = date_range.start {
            range_query.push_str(&format!("&start={}", start.format(REPORT_DATE_FORMAT)));
        }
        if let Some(end) = date_range.end {
            range_query.push_str(&format!("&end={}", end.format(REPORT_DATE_FORMAT)));
        }

        ExportFormat::all()
            .into_iter()
            .map(|format| {
                let label = match format {
                    ExportFormat::Ods => &self.labels.download_ods,
                    ExportFormat::Xls => &self.labels.download_xls,
                    ExportFormat::Text => &self.labels.download_txt,
                    ExportFormat::Archive => &self.labels.download_zip,
                };
                DownloadLink {
                    format: format.download_param().to_string(),
                    label: label.clone(),
                    url: format!(
                        "{}/{}/report?download={}{}",
                        self.base_path,
                        certificate_id,
                        format.download_param(),
                        range_query
                    ),
                }
            })
            .collect()
    }
}

fn pagination(total: i64, window: PageWindow) -> PaginationView {
    let total_pages = window.total_pages(total);
    PaginationView {
        page: window.page,
        per_page: window.per_page,
        total,
        total_pages,
        has_previous: !window.is_unpaged() && window.page > 0,
        has_next: !window.is_unpaged() && window.page + 1 < total_pages,
    }
}

fn filter_view(date_range: &DateRange) -> DateFilterView {
    DateFilterView {
        start: date_range
            .start
            .map(|d| d.format(REPORT_DATE_FORMAT).to_string()),
        end: date_range
            .end
            .map(|d| d.format(REPORT_DATE_FORMAT).to_string()),
    }
}
