//! Certificate activity models.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Group mode of a certificate activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    #[default]
    NoGroups,
    /// Members only see their own groups.
    Separate,
    /// Members see every group.
    Visible,
}

impl GroupMode {
    /// Maps the stored numeric mode (0, 1, 2). Unknown values mean no groups.
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => GroupMode::Separate,
            2 => GroupMode::Visible,
            _ => GroupMode::NoGroups,
        }
    }

    pub fn code(&self) -> i16 {
        match self {
            GroupMode::NoGroups => 0,
            GroupMode::Separate => 1,
            GroupMode::Visible => 2,
        }
    }
}

/// How the course grade is printed on a certificate and in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradeDisplay {
    #[default]
    None,
    Points,
    Percentage,
    /// Pre-formatted grade text from the gradebook (letters, scales).
    Text,
}

impl FromStr for GradeDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(GradeDisplay::None),
            "points" => Ok(GradeDisplay::Points),
            "percentage" => Ok(GradeDisplay::Percentage),
            "text" => Ok(GradeDisplay::Text),
            _ => Err(format!("Unknown grade display: {}", s)),
        }
    }
}

impl std::fmt::Display for GradeDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeDisplay::None => write!(f, "none"),
            GradeDisplay::Points => write!(f, "points"),
            GradeDisplay::Percentage => write!(f, "percentage"),
            GradeDisplay::Text => write!(f, "text"),
        }
    }
}

/// A certificate activity together with the course it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateContext {
    pub certificate_id: i64,
    pub name: String,
    pub course_id: i64,
    pub course_short_name: String,
    pub course_full_name: String,
    pub group_mode: GroupMode,
    pub grade_display: GradeDisplay,
}
