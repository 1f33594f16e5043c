//! Repository backing the record filter.

use async_trait::async_trait;
use domain::models::{IssueFilter, IssueRecord, IssueSnapshot, IssueSort, SortDirection, SortField};
use domain::services::{IssueStore, StoreError};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::entities::IssueRowEntity;
use crate::metrics::QueryTimer;

const ISSUE_SELECT: &str = r#"
    SELECT ci.id AS issue_id,
           u.id AS user_id,
           u.first_name,
           u.last_name,
           u.id_number,
           ci.issued_at,
           ci.code,
           (g.user_id IS NOT NULL) AS has_grade,
           g.final_grade,
           g.grade_max,
           g.display_grade,
           ARRAY(
               SELECT cg.name
               FROM course_groups cg
               JOIN group_members gm ON gm.group_id = cg.id
               WHERE cg.course_id = $7 AND gm.user_id = u.id
               ORDER BY cg.name, cg.id
           ) AS group_names
    FROM certificate_issues ci
    JOIN users u ON u.id = ci.user_id
    LEFT JOIN course_grades g ON g.course_id = $7 AND g.user_id = u.id
"#;

// Shared by the listing and the count. Parameters: $1 certificate,
// $2 lower bound, $3 exclusive upper bound, $4 group ids (NULL = all).
const ISSUE_WHERE: &str = r#"
    WHERE ci.certificate_id = $1
      AND u.deleted = FALSE
      AND ($2::timestamptz IS NULL OR ci.issued_at >= $2)
      AND ($3::timestamptz IS NULL OR ci.issued_at < $3)
      AND ($4::bigint[] IS NULL OR EXISTS (
          SELECT 1 FROM group_members gm
          WHERE gm.user_id = u.id AND gm.group_id = ANY($4)
      ))
"#;

/// Builds the ORDER BY clause from the whitelisted sort.
fn order_clause(sort: &IssueSort) -> String {
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    let columns: &[&str] = match sort.field {
        SortField::FullName => &["LOWER(u.first_name)", "LOWER(u.last_name)"],
        SortField::LastName => &["LOWER(u.last_name)"],
        SortField::FirstName => &["LOWER(u.first_name)"],
        SortField::IssuedAt => &["ci.issued_at"],
        SortField::Code => &["ci.code"],
    };
    let ordered: Vec<String> = columns
        .iter()
        .map(|column| format!("{} {}", column, direction))
        .collect();
    format!("ORDER BY {}, ci.id ASC", ordered.join(", "))
}

fn listing_sql(filter: &IssueFilter) -> String {
    format!(
        "{} {} {} LIMIT $5 OFFSET $6",
        ISSUE_SELECT,
        ISSUE_WHERE,
        order_clause(&filter.sort)
    )
}

fn count_sql() -> String {
    format!(
        "SELECT COUNT(*) FROM certificate_issues ci JOIN users u ON u.id = ci.user_id {}",
        ISSUE_WHERE
    )
}

fn bind_listing<'q>(
    query: QueryAs<'q, Postgres, IssueRowEntity, PgArguments>,
    filter: &IssueFilter,
) -> QueryAs<'q, Postgres, IssueRowEntity, PgArguments> {
    query
        .bind(filter.certificate_id)
        .bind(filter.date_range.lower_bound())
        .bind(filter.date_range.upper_bound_exclusive())
        .bind(filter.scope.group_ids().map(<[i64]>::to_vec))
        .bind(filter.window.limit())
        .bind(filter.window.offset())
        .bind(filter.course_id)
}

#[derive(Clone)]
pub struct IssueRepository {
    pool: PgPool,
}

impl IssueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists issues matching the filter in sort order.
    pub async fn find_issues(&self, filter: &IssueFilter) -> Result<Vec<IssueRowEntity>, sqlx::Error> {
        if filter.matches_nothing() {
            return Ok(Vec::new());
        }

        let timer = QueryTimer::new("find_certificate_issues");
        let sql = listing_sql(filter);
        let result = bind_listing(sqlx::query_as::<_, IssueRowEntity>(&sql), filter)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Reads a page and the total count inside one read-only
    /// repeatable-read transaction so both see the same data.
    pub async fn find_page_with_total(
        &self,
        filter: &IssueFilter,
    ) -> Result<(Vec<IssueRowEntity>, i64), sqlx::Error> {
        if filter.matches_nothing() {
            return Ok((Vec::new(), 0));
        }

        let timer = QueryTimer::new("find_certificate_issue_page");
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let sql = listing_sql(filter);
        let rows = bind_listing(sqlx::query_as::<_, IssueRowEntity>(&sql), filter)
            .fetch_all(&mut *tx)
            .await?;

        let count_sql = count_sql();
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.certificate_id)
            .bind(filter.date_range.lower_bound())
            .bind(filter.date_range.upper_bound_exclusive())
            .bind(filter.scope.group_ids().map(<[i64]>::to_vec))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok((rows, total))
    }
}

#[async_trait]
impl IssueStore for IssueRepository {
    async fn filter(&self, filter: &IssueFilter) -> Result<Vec<IssueRecord>, StoreError> {
        let rows = self.find_issues(filter).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn snapshot(&self, filter: &IssueFilter) -> Result<IssueSnapshot, StoreError> {
        let (rows, total) = self.find_page_with_total(filter).await?;
        Ok(IssueSnapshot {
            records: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }
}
