//! Repository for issued certificate files.

use async_trait::async_trait;
use domain::models::AttachmentRef;
use domain::services::{AttachmentStore, StoreError};
use sqlx::PgPool;

use crate::entities::CertificateFileEntity;
use crate::metrics::QueryTimer;

const FILE_SELECT: &str = r#"
    SELECT f.id, f.issue_id, ci.certificate_id, f.file_name, f.file_size
    FROM certificate_files f
    JOIN certificate_issues ci ON ci.id = f.issue_id
"#;

#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_issue_ids(
        &self,
        issue_ids: &[i64],
    ) -> Result<Vec<CertificateFileEntity>, sqlx::Error> {
        if issue_ids.is_empty() {
            return Ok(Vec::new());
        }

        let timer = QueryTimer::new("find_certificate_files_by_issues");
        let sql = format!("{} WHERE f.issue_id = ANY($1) ORDER BY f.issue_id, f.id", FILE_SELECT);
        let result = sqlx::query_as::<_, CertificateFileEntity>(&sql)
            .bind(issue_ids.to_vec())
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, file_id: i64) -> Result<Option<CertificateFileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_certificate_file_by_id");
        let sql = format!("{} WHERE f.id = $1", FILE_SELECT);
        let result = sqlx::query_as::<_, CertificateFileEntity>(&sql)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Returns the stored bytes; `None` if the row or its content is gone.
    pub async fn find_content(&self, file_id: i64) -> Result<Option<Vec<u8>>, sqlx::Error> {
        let timer = QueryTimer::new("find_certificate_file_content");
        let result: Result<Option<Option<Vec<u8>>>, sqlx::Error> =
            sqlx::query_scalar("SELECT content FROM certificate_files WHERE id = $1")
                .bind(file_id)
                .fetch_optional(&self.pool)
                .await;
        timer.record();
        Ok(result?.flatten())
    }
}

#[async_trait]
impl AttachmentStore for AttachmentRepository {
    async fn list_for_issue(&self, issue_id: i64) -> Result<Vec<AttachmentRef>, StoreError> {
        let rows = self.find_by_issue_ids(&[issue_id]).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_issues(&self, issue_ids: &[i64]) -> Result<Vec<AttachmentRef>, StoreError> {
        let rows = self.find_by_issue_ids(issue_ids).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_file(&self, file_id: i64) -> Result<Option<AttachmentRef>, StoreError> {
        Ok(self.find_by_id(file_id).await?.map(Into::into))
    }

    async fn fetch_content(&self, file_id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.find_content(file_id).await?)
    }
}
