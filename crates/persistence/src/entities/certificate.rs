//! Certificate entity (database row mapping).

use domain::models::{CertificateContext, GradeDisplay, GroupMode};
use sqlx::FromRow;

/// A certificate joined with its course.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateEntity {
    pub id: i64,
    pub name: String,
    pub course_id: i64,
    pub course_short_name: String,
    pub course_full_name: String,
    pub group_mode: i16,
    pub grade_display: String,
}

impl From<CertificateEntity> for CertificateContext {
    fn from(entity: CertificateEntity) -> Self {
        Self {
            certificate_id: entity.id,
            name: entity.name,
            course_id: entity.course_id,
            course_short_name: entity.course_short_name,
            course_full_name: entity.course_full_name,
            group_mode: GroupMode::from_code(entity.group_mode),
            grade_display: entity
                .grade_display
                .parse::<GradeDisplay>()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_conversion() {
        let entity = CertificateEntity {
            id: 5,
            name: "Completion".to_string(),
            course_id: 2,
            course_short_name: "BIO101".to_string(),
            course_full_name: "Biology".to_string(),
            group_mode: 1,
            grade_display: "percentage".to_string(),
        };
        let ctx: CertificateContext = entity.into();
        assert_eq!(ctx.certificate_id, 5);
        assert_eq!(ctx.group_mode, GroupMode::Separate);
        assert_eq!(ctx.grade_display, GradeDisplay::Percentage);
    }

    #[test]
    fn test_unknown_grade_display_falls_back_to_none() {
        let entity = CertificateEntity {
            id: 5,
            name: "Completion".to_string(),
            course_id: 2,
            course_short_name: "BIO101".to_string(),
            course_full_name: "Biology".to_string(),
            group_mode: 7,
            grade_display: "stars".to_string(),
        };
        let ctx: CertificateContext = entity.into();
        assert_eq!(ctx.group_mode, GroupMode::NoGroups);
        assert_eq!(ctx.grade_display, GradeDisplay::None);
    }
}
