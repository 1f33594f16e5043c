//! Grade resolution.

use crate::models::{CertificateContext, CourseGrade, GradeDisplay};

/// Turns a user's course grade into the string shown in reports.
pub trait GradeResolver: Send + Sync {
    fn resolve(&self, certificate: &CertificateContext, grade: Option<&CourseGrade>) -> String;
}

/// Formats gradebook values according to the certificate's grade display.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradebookResolver;

impl GradeResolver for GradebookResolver {
    fn resolve(&self, certificate: &CertificateContext, grade: Option<&CourseGrade>) -> String {
        let Some(grade) = grade else {
            return String::new();
        };

        match certificate.grade_display {
            GradeDisplay::None => String::new(),
            GradeDisplay::Points => match grade.final_grade {
                Some(value) => format!("{:.2}/{:.2}", value, grade.grade_max),
                None => String::new(),
            },
            GradeDisplay::Percentage => match grade.final_grade {
                Some(value) if grade.grade_max > 0.0 => {
                    format!("{:.2}%", value / grade.grade_max * 100.0)
                }
                _ => String::new(),
            },
            GradeDisplay::Text => grade.display_grade.clone().unwrap_or_default(),
        }
    }
}
