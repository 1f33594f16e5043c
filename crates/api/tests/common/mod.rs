//! Common test utilities for integration tests.
//!
//! The report core reads through store traits, so these tests drive the real
//! router over an in-memory implementation instead of a database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use certificate_report_api::{
    app::create_app_with_stores,
    config::{Config, DatabaseConfig, LoggingConfig, ReportConfig, SecurityConfig, ServerConfig},
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use domain::models::{
    AttachmentRef, CertificateContext, CourseGrade, GradeDisplay, GroupMode, IssueFilter,
    IssueRecord, IssueSnapshot,
};
use domain::services::{
    AccessPolicy, AttachmentStore, Caller, CertificateDirectory, CourseAccess, IssueStore,
    ReportStores, StoreError,
};
use shared::crypto::sha256_hex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const COURSE_ID: i64 = 10;
pub const CERTIFICATE_ID: i64 = 5;

pub const MANAGER_ID: i64 = 100;
pub const MANAGER_KEY: &str = "cr_manager_key_0001";

pub const STUDENT_ID: i64 = 200;
pub const STUDENT_KEY: &str = "cr_student_key_0001";

pub const ADMIN_ID: i64 = 1;
pub const ADMIN_KEY: &str = "cr_admin_key_00001";

struct StoredIssue {
    certificate_id: i64,
    record: IssueRecord,
    group_ids: Vec<i64>,
    user_deleted: bool,
}

struct StoredFile {
    file: AttachmentRef,
    content: Option<Vec<u8>>,
}

/// In-memory implementation of every report store.
#[derive(Default)]
pub struct MemoryStore {
    certificates: Mutex<HashMap<i64, CertificateContext>>,
    issues: Mutex<Vec<StoredIssue>>,
    files: Mutex<Vec<StoredFile>>,
    keys: Mutex<HashMap<String, Caller>>,
    access: Mutex<HashMap<(i64, i64), CourseAccess>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stores(self: &Arc<Self>) -> ReportStores {
        ReportStores {
            certificates: self.clone(),
            issues: self.clone(),
            attachments: self.clone(),
            access: self.clone(),
        }
    }

    pub fn add_certificate(&self, certificate: CertificateContext) {
        self.certificates
            .lock()
            .unwrap()
            .insert(certificate.certificate_id, certificate);
    }

    pub fn add_issue(&self, certificate_id: i64, record: IssueRecord, group_ids: &[i64]) {
        self.issues.lock().unwrap().push(StoredIssue {
            certificate_id,
            record,
            group_ids: group_ids.to_vec(),
            user_deleted: false,
        });
    }

    pub fn add_deleted_user_issue(&self, certificate_id: i64, record: IssueRecord) {
        self.issues.lock().unwrap().push(StoredIssue {
            certificate_id,
            record,
            group_ids: vec![],
            user_deleted: true,
        });
    }

    pub fn add_file(&self, file: AttachmentRef, content: Option<Vec<u8>>) {
        self.files.lock().unwrap().push(StoredFile { file, content });
    }

    pub fn add_caller(&self, api_key: &str, user_id: i64, is_admin: bool) {
        self.keys.lock().unwrap().insert(
            sha256_hex(api_key),
            Caller {
                user_id,
                api_key_id: user_id,
                is_admin,
            },
        );
    }

    pub fn grant(&self, user_id: i64, course_id: i64, access: CourseAccess) {
        self.access
            .lock()
            .unwrap()
            .insert((user_id, course_id), access);
    }

    fn matching(&self, filter: &IssueFilter) -> Vec<IssueRecord> {
        if filter.matches_nothing() {
            return vec![];
        }

        let mut records: Vec<IssueRecord> = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.certificate_id == filter.certificate_id && !i.user_deleted)
            .filter(|i| filter.date_range.contains(i.record.issued_at))
            .filter(|i| filter.scope.admits(&i.group_ids))
            .map(|i| i.record.clone())
            .collect();
        records.sort_by(|a, b| filter.sort.compare(a, b));
        records
    }
}

#[async_trait]
impl CertificateDirectory for MemoryStore {
    async fn find_certificate(
        &self,
        certificate_id: i64,
    ) -> Result<Option<CertificateContext>, StoreError> {
        Ok(self.certificates.lock().unwrap().get(&certificate_id).cloned())
    }
}

#[async_trait]
impl IssueStore for MemoryStore {
    async fn filter(&self, filter: &IssueFilter) -> Result<Vec<IssueRecord>, StoreError> {
        let records = self.matching(filter);
        Ok(match filter.window.limit() {
            None => records,
            Some(limit) => records
                .into_iter()
                .skip(filter.window.offset() as usize)
                .take(limit as usize)
                .collect(),
        })
    }

    async fn snapshot(&self, filter: &IssueFilter) -> Result<IssueSnapshot, StoreError> {
        let total = self.matching(filter).len() as i64;
        let records = self.filter(filter).await?;
        Ok(IssueSnapshot { records, total })
    }
}

#[async_trait]
impl AttachmentStore for MemoryStore {
    async fn list_for_issue(&self, issue_id: i64) -> Result<Vec<AttachmentRef>, StoreError> {
        self.list_for_issues(&[issue_id]).await
    }

    async fn list_for_issues(&self, issue_ids: &[i64]) -> Result<Vec<AttachmentRef>, StoreError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| issue_ids.contains(&f.file.issue_id))
            .map(|f| f.file.clone())
            .collect())
    }

    async fn find_file(&self, file_id: i64) -> Result<Option<AttachmentRef>, StoreError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.file.file_id == file_id)
            .map(|f| f.file.clone()))
    }

    async fn fetch_content(&self, file_id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.file.file_id == file_id)
            .and_then(|f| f.content.clone()))
    }
}

#[async_trait]
impl AccessPolicy for MemoryStore {
    async fn authenticate(&self, key_hash: &str) -> Result<Option<Caller>, StoreError> {
        Ok(self.keys.lock().unwrap().get(key_hash).cloned())
    }

    async fn course_access(
        &self,
        caller: &Caller,
        course_id: i64,
    ) -> Result<CourseAccess, StoreError> {
        let granted = self
            .access
            .lock()
            .unwrap()
            .get(&(caller.user_id, course_id))
            .cloned()
            .unwrap_or_default();
        if caller.is_admin {
            return Ok(CourseAccess::administrator(granted.group_ids));
        }
        Ok(granted)
    }
}

/// Test configuration with archive staging under `staging_dir`.
pub fn test_config(staging_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "postgres://unused@localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_secs: 1,
            idle_timeout_secs: 1,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
        report: ReportConfig {
            staging_dir: Some(staging_dir.to_path_buf()),
            ..ReportConfig::default()
        },
    }
}

pub fn certificate(group_mode: GroupMode, grade_display: GradeDisplay) -> CertificateContext {
    CertificateContext {
        certificate_id: CERTIFICATE_ID,
        name: "Completion".to_string(),
        course_id: COURSE_ID,
        course_short_name: "CS101".to_string(),
        course_full_name: "Computer Science 101".to_string(),
        group_mode,
        grade_display,
    }
}

pub fn issued_on(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    Utc.from_utc_datetime(&date.and_hms_opt(10, 30, 0).unwrap())
}

pub fn record(
    issue_id: i64,
    user_id: i64,
    first: &str,
    last: &str,
    issued_at: DateTime<Utc>,
    code: &str,
) -> IssueRecord {
    IssueRecord {
        issue_id,
        user_id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        id_number: None,
        issued_at,
        code: code.to_string(),
        grade: None,
        group_names: vec![],
    }
}

pub fn pass_grade() -> CourseGrade {
    CourseGrade {
        final_grade: Some(80.0),
        grade_max: 100.0,
        display_grade: Some("Pass".to_string()),
    }
}

/// A store with the certificate, a manager, a student and an administrator.
pub fn seeded_store(group_mode: GroupMode, grade_display: GradeDisplay) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.add_certificate(certificate(group_mode, grade_display));
    store.add_caller(MANAGER_KEY, MANAGER_ID, false);
    store.add_caller(STUDENT_KEY, STUDENT_ID, false);
    store.add_caller(ADMIN_KEY, ADMIN_ID, true);
    store.grant(
        MANAGER_ID,
        COURSE_ID,
        CourseAccess {
            can_manage: true,
            access_all_groups: true,
            group_ids: vec![],
        },
    );
    store
}

pub fn create_test_app(config: Config, store: &Arc<MemoryStore>) -> Router {
    create_app_with_stores(config, store.stores(), None)
}

pub async fn get_with_key(app: &Router, uri: &str, api_key: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn parse_response_body(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn report_uri(query: &str) -> String {
    if query.is_empty() {
        format!("/api/v1/certificates/{}/report", CERTIFICATE_ID)
    } else {
        format!("/api/v1/certificates/{}/report?{}", CERTIFICATE_ID, query)
    }
}
