//! Store seams consumed by the report core.
//!
//! The report core never talks to the database directly. It reads through
//! these traits, which persistence implements over PostgreSQL and tests
//! implement in memory.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{AttachmentRef, CertificateContext, IssueFilter, IssueRecord, IssueSnapshot};

/// Failure reading from a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// The authenticated principal behind an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub api_key_id: i64,
    /// Site administrators skip course capability checks.
    pub is_admin: bool,
}

/// What a caller may do inside one course.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseAccess {
    /// May view the certificate report.
    pub can_manage: bool,
    /// May see every group even in separate-groups mode.
    pub access_all_groups: bool,
    /// Groups the caller is a member of in the course.
    pub group_ids: Vec<i64>,
}

impl CourseAccess {
    /// Access granted to site administrators.
    pub fn administrator(group_ids: Vec<i64>) -> Self {
        Self {
            can_manage: true,
            access_all_groups: true,
            group_ids,
        }
    }
}

/// Looks up certificate activities and their course.
#[async_trait]
pub trait CertificateDirectory: Send + Sync {
    async fn find_certificate(
        &self,
        certificate_id: i64,
    ) -> Result<Option<CertificateContext>, StoreError>;
}

/// The issue store behind the record filter.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Returns matching records in sort order, honouring the filter's window.
    /// A `(0, 0)` window returns every match.
    async fn filter(&self, filter: &IssueFilter) -> Result<Vec<IssueRecord>, StoreError>;

    /// Returns the requested page together with the total match count, both
    /// read from the same snapshot.
    async fn snapshot(&self, filter: &IssueFilter) -> Result<IssueSnapshot, StoreError>;
}

/// Read-only access to stored certificate files.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn list_for_issue(&self, issue_id: i64) -> Result<Vec<AttachmentRef>, StoreError>;

    async fn list_for_issues(&self, issue_ids: &[i64]) -> Result<Vec<AttachmentRef>, StoreError>;

    async fn find_file(&self, file_id: i64) -> Result<Option<AttachmentRef>, StoreError>;

    /// Returns the file content, or `None` when storage no longer has it.
    async fn fetch_content(&self, file_id: i64) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Authentication and course capability checks.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Resolves an API key by its SHA-256 hex hash.
    async fn authenticate(&self, key_hash: &str) -> Result<Option<Caller>, StoreError>;

    async fn course_access(&self, caller: &Caller, course_id: i64)
        -> Result<CourseAccess, StoreError>;
}

/// The set of stores a report request needs.
#[derive(Clone)]
pub struct ReportStores {
    pub certificates: Arc<dyn CertificateDirectory>,
    pub issues: Arc<dyn IssueStore>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub access: Arc<dyn AccessPolicy>,
}
