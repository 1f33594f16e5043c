//! Report orchestration: access checks, record filtering and dispatch to
//! the table presenter or an export writer.

use chrono::NaiveDate;
use domain::models::{
    CertificateContext, EmptyReportView, ExportArtifact, ExportFormat, ExportRequest, IssueFilter,
    ReportView,
};
use domain::services::{
    resolve_group_scope, Caller, CourseAccess, FieldProjector, ReportPresenter, ReportStores,
    StoreError,
};
use thiserror::Error;
use tracing::info;

use super::export::{export, writer_for, ExportError, ExportSource};
use crate::config::ReportConfig;
use crate::middleware::record_export;

/// Prefix of the certificate routes, used for links in the table view.
pub const CERTIFICATE_ROUTES: &str = "/api/v1/certificates";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Certificate {0} not found")]
    CertificateNotFound(i64),

    #[error("Caller may not view reports for certificate {0}")]
    Forbidden(i64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What a report request produces.
#[derive(Debug)]
pub enum ReportOutcome {
    /// Nothing matched; no export is attempted.
    Empty(EmptyReportView),
    Table(ReportView),
    Export(ExportArtifact),
}

pub struct ReportService<'a> {
    stores: &'a ReportStores,
    config: &'a ReportConfig,
}

impl<'a> ReportService<'a> {
    pub fn new(stores: &'a ReportStores, config: &'a ReportConfig) -> Self {
        Self { stores, config }
    }

    /// Loads the certificate and checks the caller may manage its course.
    /// Runs before any issue record is read.
    pub async fn authorize(
        &self,
        caller: &Caller,
        certificate_id: i64,
    ) -> Result<(CertificateContext, CourseAccess), ReportError> {
        let certificate = self
            .stores
            .certificates
            .find_certificate(certificate_id)
            .await?
            .ok_or(ReportError::CertificateNotFound(certificate_id))?;

        let access = self
            .stores
            .access
            .course_access(caller, certificate.course_id)
            .await?;

        if !(caller.is_admin || access.can_manage) {
            return Err(ReportError::Forbidden(certificate_id));
        }

        Ok((certificate, access))
    }

    pub async fn run(
        &self,
        caller: &Caller,
        request: &ExportRequest,
        today: NaiveDate,
    ) -> Result<ReportOutcome, ReportError> {
        let (certificate, access) = self.authorize(caller, request.certificate_id).await?;

        let filter = IssueFilter {
            certificate_id: certificate.certificate_id,
            course_id: certificate.course_id,
            sort: request.sort,
            scope: resolve_group_scope(certificate.group_mode, &access, request.selected_group),
            window: request.effective_window(),
            date_range: request.date_range,
        };
        let projector = FieldProjector::new(certificate, self.config.date_format.clone());
        let presenter = ReportPresenter::new(&projector, &self.config.labels, CERTIFICATE_ROUTES);

        match request.format {
            Some(format) => {
                let records = self.stores.issues.filter(&filter).await?;
                if records.is_empty() {
                    return Ok(ReportOutcome::Empty(presenter.render_empty(&request.date_range)));
                }

                let source = ExportSource {
                    records: &records,
                    projector: &projector,
                    attachments: self.stores.attachments.as_ref(),
                    labels: &self.config.labels,
                    date_range: request.date_range,
                    today,
                    caller_id: caller.user_id,
                };
                let artifact = self.export(format, &source).await?;
                Ok(ReportOutcome::Export(artifact))
            }
            None => {
                let snapshot = self.stores.issues.snapshot(&filter).await?;
                if snapshot.total == 0 {
                    return Ok(ReportOutcome::Empty(presenter.render_empty(&request.date_range)));
                }

                let issue_ids: Vec<i64> = snapshot.records.iter().map(|r| r.issue_id).collect();
                let files = self.stores.attachments.list_for_issues(&issue_ids).await?;
                Ok(ReportOutcome::Table(presenter.render(
                    &snapshot,
                    &files,
                    filter.window,
                    &request.date_range,
                )))
            }
        }
    }

    async fn export(
        &self,
        format: ExportFormat,
        source: &ExportSource<'_>,
    ) -> Result<ExportArtifact, ExportError> {
        let writer = writer_for(format, self.config.staging_root());
        let artifact = export(writer.as_ref(), source).await?;

        record_export(format, source.records.len(), artifact.len());
        info!(
            certificate_id = source.projector.certificate().certificate_id,
            format = %format,
            rows = source.records.len(),
            bytes = artifact.len(),
            "Certificate report exported"
        );
        Ok(artifact)
    }
}
