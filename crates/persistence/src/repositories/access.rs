//! API key authentication and course capability lookups.

use async_trait::async_trait;
use chrono::Utc;
use domain::services::{AccessPolicy, Caller, CourseAccess, StoreError};
use sqlx::PgPool;

use crate::entities::ApiKeyEntity;
use crate::metrics::QueryTimer;

/// Roles allowed to view certificate reports.
const MANAGE_ROLES: &[&str] = &["manager", "editingteacher", "teacher"];

/// Roles that see every group regardless of group mode.
const ALL_GROUPS_ROLES: &[&str] = &["manager", "editingteacher"];

/// Derives course access from the caller's role names and group ids.
pub fn access_from_roles(roles: &[String], group_ids: Vec<i64>) -> CourseAccess {
    let has_any = |allowed: &[&str]| roles.iter().any(|role| allowed.contains(&role.as_str()));
    CourseAccess {
        can_manage: has_any(MANAGE_ROLES),
        access_all_groups: has_any(ALL_GROUPS_ROLES),
        group_ids,
    }
}

#[derive(Clone)]
pub struct AccessRepository {
    pool: PgPool,
}

impl AccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_key_hash(&self, key_hash: &str) -> Result<Option<ApiKeyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_api_key_by_hash");
        let result = sqlx::query_as::<_, ApiKeyEntity>(
            r#"
            SELECT id, user_id, key_hash, key_prefix, name, is_active, is_admin,
                   last_used_at, created_at, expires_at
            FROM api_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_last_used(&self, key_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(key_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_roles(&self, course_id: i64, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("find_course_roles");
        let result = sqlx::query_scalar(
            "SELECT role FROM course_roles WHERE course_id = $1 AND user_id = $2",
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_group_ids(&self, course_id: i64, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_group_ids");
        let result = sqlx::query_scalar(
            r#"
            SELECT gm.group_id
            FROM group_members gm
            JOIN course_groups cg ON cg.id = gm.group_id
            WHERE cg.course_id = $1 AND gm.user_id = $2
            ORDER BY gm.group_id
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[async_trait]
impl AccessPolicy for AccessRepository {
    async fn authenticate(&self, key_hash: &str) -> Result<Option<Caller>, StoreError> {
        let Some(key) = self.find_by_key_hash(key_hash).await? else {
            return Ok(None);
        };

        if !key.is_valid_at(Utc::now()) {
            tracing::debug!(key_prefix = %key.key_prefix, "Rejected inactive or expired API key");
            return Ok(None);
        }

        let repo = self.clone();
        let key_id = key.id;
        tokio::spawn(async move {
            if let Err(e) = repo.update_last_used(key_id).await {
                tracing::warn!(key_id, error = %e, "Failed to update API key last_used_at");
            }
        });

        Ok(Some(Caller {
            user_id: key.user_id,
            api_key_id: key.id,
            is_admin: key.is_admin,
        }))
    }

    async fn course_access(
        &self,
        caller: &Caller,
        course_id: i64,
    ) -> Result<CourseAccess, StoreError> {
        let group_ids = self.find_group_ids(course_id, caller.user_id).await?;
        if caller.is_admin {
            return Ok(CourseAccess::administrator(group_ids));
        }

        let roles = self.find_roles(course_id, caller.user_id).await?;
        Ok(access_from_roles(&roles, group_ids))
    }
}
