//! Certificate issue entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{CourseGrade, IssueRecord};
use sqlx::FromRow;

/// An issue joined with its user, course grade and group names.
#[derive(Debug, Clone, FromRow)]
pub struct IssueRowEntity {
    pub issue_id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub id_number: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub code: String,
    pub has_grade: bool,
    pub final_grade: Option<f64>,
    pub grade_max: Option<f64>,
    pub display_grade: Option<String>,
    pub group_names: Vec<String>,
}

impl From<IssueRowEntity> for IssueRecord {
    fn from(entity: IssueRowEntity) -> Self {
        let grade = entity.has_grade.then(|| CourseGrade {
            final_grade: entity.final_grade,
            grade_max: entity.grade_max.unwrap_or(100.0),
            display_grade: entity.display_grade,
        });

        Self {
            issue_id: entity.issue_id,
            user_id: entity.user_id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            id_number: entity.id_number,
            issued_at: entity.issued_at,
            code: entity.code,
            grade,
            group_names: entity.group_names,
        }
    }
}
