//! ZIP bundle of issued certificate PDFs.

use async_trait::async_trait;
use domain::models::{display_file_name, AttachmentRef, ExportFormat};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{ExportError, ExportSource, ExportWriter};

const BUNDLE_FILE: &str = "bundle.zip";

/// Stages every generated PDF of the exported records under a private
/// temporary directory, zips them and returns the archive bytes.
///
/// The staging directory is a `TempDir`, so it is removed on every exit
/// path: success, error, or the request future being dropped.
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    staging_root: PathBuf,
}

impl ArchiveWriter {
    pub fn new(staging_root: PathBuf) -> Self {
        Self { staging_root }
    }
}

/// Hands out archive entry names, suffixing ` (n)` on collisions.
#[derive(Debug, Default)]
struct EntryNames {
    used: HashSet<String>,
}

impl EntryNames {
    fn claim(&mut self, name: &str) -> String {
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }

        let (stem, ext) = match name.rfind('.') {
            Some(idx) if idx > 0 => name.split_at(idx),
            _ => (name, ""),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{} ({}){}", stem, n, ext);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

struct StagedEntry {
    name: String,
    path: PathBuf,
}

fn build_archive(target: &Path, entries: &[StagedEntry]) -> Result<(), ExportError> {
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(File::create(target)?);
    for entry in entries {
        zip.start_file(entry.name.as_str(), options)?;
        let mut staged = File::open(&entry.path)?;
        std::io::copy(&mut staged, &mut zip)?;
    }
    zip.finish()?;
    Ok(())
}

/// Zips the staged entries and reads the archive back. The staging
/// directory is owned here so it is removed by the thread that wrote it.
fn bundle(staging: TempDir, entries: &[StagedEntry]) -> Result<Vec<u8>, ExportError> {
    let bundle_path = staging.path().join(BUNDLE_FILE);
    build_archive(&bundle_path, entries)?;
    let body = std::fs::read(&bundle_path)?;

    if let Err(e) = staging.close() {
        tracing::warn!(error = %e, "Failed to remove archive staging directory");
    }
    Ok(body)
}

#[async_trait]
impl ExportWriter for ArchiveWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Archive
    }

    async fn write(&self, source: &ExportSource<'_>) -> Result<Vec<u8>, ExportError> {
        let certificate = source.projector.certificate();

        tokio::fs::create_dir_all(&self.staging_root).await?;
        let prefix = format!("cert_{}_{}_", source.caller_id, certificate.certificate_id);
        let staging = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&self.staging_root)?;

        let mut names = EntryNames::default();
        let mut entries = Vec::new();

        for record in source.records {
            let files: Vec<AttachmentRef> = source
                .attachments
                .list_for_issue(record.issue_id)
                .await?
                .into_iter()
                .filter(AttachmentRef::is_generated)
                .collect();
            if files.is_empty() {
                tracing::debug!(issue_id = record.issue_id, "No generated certificate file");
                continue;
            }

            let user_dir = staging.path().join(format!("user_{}", record.user_id));
            tokio::fs::create_dir_all(&user_dir).await?;
            let display_name = display_file_name(record, certificate);

            for file in files {
                let content = match source.attachments.fetch_content(file.file_id).await? {
                    Some(content) if !content.is_empty() => content,
                    _ => {
                        tracing::debug!(
                            issue_id = record.issue_id,
                            file_id = file.file_id,
                            "Certificate file missing from storage"
                        );
                        continue;
                    }
                };

                let name = names.claim(&display_name);
                let path = user_dir.join(&name);
                tokio::fs::write(&path, &content).await?;
                entries.push(StagedEntry { name, path });
            }
        }

        let staged_count = entries.len();
        let body = tokio::task::spawn_blocking(move || bundle(staging, &entries))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))??;

        tracing::debug!(
            entries = staged_count,
            bytes = body.len(),
            "Certificate archive built"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use domain::models::ReportLabels;
    use domain::services::{AttachmentStore, FieldProjector, StoreError, DEFAULT_DATE_FORMAT};
    use std::collections::HashMap;
    use std::io::{Cursor, Read};

    fn file(file_id: i64, issue_id: i64, size: i64) -> AttachmentRef {
        AttachmentRef {
            file_id,
            issue_id,
            certificate_id: 5,
            file_name: format!("certificate_{}.pdf", file_id),
            file_size: size,
        }
    }

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    fn staging_is_empty(root: &Path) -> bool {
        std::fs::read_dir(root).unwrap().next().is_none()
    }

    #[test]
    fn test_entry_names_are_unique() {
        let mut names = EntryNames::default();
        assert_eq!(names.claim("Jane Doe_C_Cert.pdf"), "Jane Doe_C_Cert.pdf");
        assert_eq!(names.claim("Jane Doe_C_Cert.pdf"), "Jane Doe_C_Cert (2).pdf");
        assert_eq!(names.claim("Jane Doe_C_Cert.pdf"), "Jane Doe_C_Cert (3).pdf");
        assert_eq!(names.claim("noext"), "noext");
        assert_eq!(names.claim("noext"), "noext (2)");
    }

    #[tokio::test]
    async fn test_zero_byte_files_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        let projector = FieldProjector::new(certificate(), DEFAULT_DATE_FORMAT);
        let labels = ReportLabels::default();
        let attachments = FixedAttachments {
            files: vec![file(10, 1, 0), file(11, 1, 1024)],
            contents: HashMap::from([(10, Vec::new()), (11, vec![7u8; 1024])]),
        };
        let records = vec![record(1, "Jane", "Doe")];

        let bytes = ArchiveWriter::new(root.path().to_path_buf())
            .write(&source(&records, &projector, &attachments, &labels))
            .await
            .unwrap();

        assert_eq!(
            entry_names(bytes.clone()),
            vec!["Jane Doe_BIO101_Course Completion.pdf"]
        );
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = Vec::new();
        archive.by_index(0).unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, vec![7u8; 1024]);
        assert!(staging_is_empty(root.path()));
    }

    #[tokio::test]
    async fn test_missing_content_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let projector = FieldProjector::new(certificate(), DEFAULT_DATE_FORMAT);
        let labels = ReportLabels::default();
        let attachments = FixedAttachments {
            files: vec![file(10, 1, 2048)],
            contents: HashMap::new(),
        };
        let records = vec![record(1, "Jane", "Doe"), record(2, "John", "Roe")];

        let bytes = ArchiveWriter::new(root.path().to_path_buf())
            .write(&source(&records, &projector, &attachments, &labels))
            .await
            .unwrap();

        assert!(entry_names(bytes).is_empty());
        assert!(staging_is_empty(root.path()));
    }

    #[tokio::test]
    async fn test_same_named_users_get_distinct_entries() {
        let root = tempfile::tempdir().unwrap();
        let projector = FieldProjector::new(certificate(), DEFAULT_DATE_FORMAT);
        let labels = ReportLabels::default();
        let attachments = FixedAttachments {
            files: vec![file(10, 1, 3), file(11, 2, 3)],
            contents: HashMap::from([(10, b"one".to_vec()), (11, b"two".to_vec())]),
        };
        let records = vec![record(1, "Jane", "Doe"), record(2, "Jane", "Doe")];

        let bytes = ArchiveWriter::new(root.path().to_path_buf())
            .write(&source(&records, &projector, &attachments, &labels))
            .await
            .unwrap();

        assert_eq!(
            entry_names(bytes),
            vec![
                "Jane Doe_BIO101_Course Completion.pdf",
                "Jane Doe_BIO101_Course Completion (2).pdf",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_staging_failure_propagates() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let projector = FieldProjector::new(certificate(), DEFAULT_DATE_FORMAT);
        let labels = ReportLabels::default();
        let attachments = FixedAttachments::default();
        let records = vec![record(1, "Jane", "Doe")];

        let result = ArchiveWriter::new(blocker.join("staging"))
            .write(&source(&records, &projector, &attachments, &labels))
            .await;

        assert!(matches!(result, Err(ExportError::Staging(_))));
    }

    /// Serves the first file and fails on every later content fetch.
    struct FailAfterFirst {
        inner: FixedAttachments,
        fetches: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl AttachmentStore for FailAfterFirst {
        async fn list_for_issue(&self, issue_id: i64) -> Result<Vec<AttachmentRef>, StoreError> {
            self.inner.list_for_issue(issue_id).await
        }

        async fn list_for_issues(&self, issue_ids: &[i64]) -> Result<Vec<AttachmentRef>, StoreError> {
            self.inner.list_for_issues(issue_ids).await
        }

        async fn find_file(&self, file_id: i64) -> Result<Option<AttachmentRef>, StoreError> {
            self.inner.find_file(file_id).await
        }

        async fn fetch_content(&self, file_id: i64) -> Result<Option<Vec<u8>>, StoreError> {
            let seen = self
                .fetches
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if seen == 0 {
                self.inner.fetch_content(file_id).await
            } else {
                Err(StoreError::Unavailable("file storage offline".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_failure_after_staging_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let projector = FieldProjector::new(certificate(), DEFAULT_DATE_FORMAT);
        let labels = ReportLabels::default();
        let fixed = FixedAttachments::default();
        let attachments = FailAfterFirst {
            inner: FixedAttachments {
                files: vec![file(10, 1, 3), file(11, 2, 3)],
                contents: HashMap::from([(10, b"one".to_vec()), (11, b"two".to_vec())]),
            },
            fetches: std::sync::atomic::AtomicUsize::new(0),
        };
        let records = vec![record(1, "Jane", "Doe"), record(2, "John", "Roe")];

        let mut source = source(&records, &projector, &fixed, &labels);
        source.attachments = &attachments;
        let result = ArchiveWriter::new(root.path().to_path_buf())
            .write(&source)
            .await;

        assert!(matches!(result, Err(ExportError::Store(_))));
        assert_eq!(
            attachments.fetches.load(std::sync::atomic::Ordering::SeqCst),
            2
        );
        assert!(staging_is_empty(root.path()));
    }
}
