//! Certificate file entity (database row mapping).

use domain::models::AttachmentRef;
use sqlx::FromRow;

/// File metadata; the content column is fetched separately.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateFileEntity {
    pub id: i64,
    pub issue_id: i64,
    pub certificate_id: i64,
    pub file_name: String,
    pub file_size: i64,
}

impl From<CertificateFileEntity> for AttachmentRef {
    fn from(entity: CertificateFileEntity) -> Self {
        Self {
            file_id: entity.id,
            issue_id: entity.issue_id,
            certificate_id: entity.certificate_id,
            file_name: entity.file_name,
            file_size: entity.file_size,
        }
    }
}
