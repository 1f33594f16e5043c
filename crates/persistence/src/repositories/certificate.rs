//! Repository for certificate lookups.

use async_trait::async_trait;
use domain::models::CertificateContext;
use domain::services::{CertificateDirectory, StoreError};
use sqlx::PgPool;

use crate::entities::CertificateEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct CertificateRepository {
    pool: PgPool,
}

impl CertificateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a certificate together with its course.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<CertificateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_certificate_by_id");
        let result = sqlx::query_as::<_, CertificateEntity>(
            r#"
            SELECT c.id, c.name, c.course_id,
                   co.short_name AS course_short_name,
                   co.full_name AS course_full_name,
                   c.group_mode, c.grade_display
            FROM certificates c
            JOIN courses co ON co.id = c.course_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[async_trait]
impl CertificateDirectory for CertificateRepository {
    async fn find_certificate(
        &self,
        certificate_id: i64,
    ) -> Result<Option<CertificateContext>, StoreError> {
        Ok(self.find_by_id(certificate_id).await?.map(Into::into))
    }
}
