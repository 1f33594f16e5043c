//! Export writers.
//!
//! One writer per output format behind a shared trait. Every writer reads the
//! same `ExportSource`: the unpaged record set, the projector that flattens
//! records into rows, and the attachment store for the archive variant.

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::models::{DateRange, ExportArtifact, ExportFormat, IssueRecord, ProjectedRow, ReportLabels};
use domain::services::{AttachmentStore, FieldProjector, StoreError};
use shared::filename::export_basename;
use std::path::PathBuf;
use thiserror::Error;

pub mod archive;
pub mod ods;
pub mod spreadsheet;
pub mod text;
pub mod xls;

pub use archive::ArchiveWriter;
pub use ods::OdsWriter;
pub use text::{TextWriter, TEXT_EXPORT_HEADERS};
pub use xls::XlsWriter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Staging I/O failed: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Archive encoding failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Export task failed: {0}")]
    Task(String),
}

/// Everything a writer needs to produce one artifact.
pub struct ExportSource<'a> {
    pub records: &'a [IssueRecord],
    pub projector: &'a FieldProjector,
    pub attachments: &'a dyn AttachmentStore,
    pub labels: &'a ReportLabels,
    pub date_range: DateRange,
    /// Export day, used in the filename when the range is open.
    pub today: NaiveDate,
    /// Keeps staging directories of concurrent callers apart.
    pub caller_id: i64,
}

impl<'a> ExportSource<'a> {
    /// Projected rows, produced lazily in record order.
    pub fn rows(&self) -> impl Iterator<Item = ProjectedRow> + 'a {
        self.projector.project_all(self.records)
    }

    pub fn filename(&self, format: ExportFormat) -> String {
        format!(
            "{}.{}",
            export_basename(
                self.date_range.start,
                self.date_range.end,
                self.today,
                &self.projector.certificate().name,
            ),
            format.extension()
        )
    }
}

#[async_trait]
pub trait ExportWriter: Send + Sync {
    fn format(&self) -> ExportFormat;

    async fn write(&self, source: &ExportSource<'_>) -> Result<Vec<u8>, ExportError>;
}

/// Selects the writer for a `download` format.
pub fn writer_for(format: ExportFormat, staging_root: PathBuf) -> Box<dyn ExportWriter> {
    match format {
        ExportFormat::Ods => Box::new(OdsWriter),
        ExportFormat::Xls => Box::new(XlsWriter),
        ExportFormat::Text => Box::new(TextWriter),
        ExportFormat::Archive => Box::new(ArchiveWriter::new(staging_root)),
    }
}

/// Runs a writer and wraps its output with the derived filename.
pub async fn export(
    writer: &dyn ExportWriter,
    source: &ExportSource<'_>,
) -> Result<ExportArtifact, ExportError> {
    let format = writer.format();
    let body = writer.write(source).await?;
    Ok(ExportArtifact {
        format,
        filename: source.filename(format),
        body,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use domain::services::DEFAULT_DATE_FORMAT;

    #[test]
    fn test_filename_uses_export_day_for_open_range() {
        let projector = FieldProjector::new(certificate(), DEFAULT_DATE_FORMAT);
        let attachments = FixedAttachments::default();
        let labels = ReportLabels::default();
        let source = source(&[], &projector, &attachments, &labels);
        assert_eq!(
            source.filename(ExportFormat::Ods),
            "01032024_Course Completion.ods"
        );
    }

    #[test]
    fn test_filename_uses_closed_range() {
        let projector = FieldProjector::new(certificate(), DEFAULT_DATE_FORMAT);
        let attachments = FixedAttachments::default();
        let labels = ReportLabels::default();
        let mut source = source(&[], &projector, &attachments, &labels);
        source.date_range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        );
        assert_eq!(
            source.filename(ExportFormat::Archive),
            "01012024_31012024_Course Completion.zip"
        );
    }

    #[test]
    fn test_writer_for_selects_matching_format() {
        for format in ExportFormat::all() {
            assert_eq!(writer_for(format, std::env::temp_dir()).format(), format);
        }
    }
}
