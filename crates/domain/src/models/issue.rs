//! Certificate issue records and the filter that selects them.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use shared::pagination::PageWindow;
use std::cmp::Ordering;
use std::str::FromStr;

/// The user's course grade as stored in the gradebook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseGrade {
    pub final_grade: Option<f64>,
    pub grade_max: f64,
    /// Pre-formatted grade (letter or scale item), if the gradebook has one.
    pub display_grade: Option<String>,
}

/// One awarded certificate. Read-only inside the report core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    pub issue_id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub id_number: Option<String>,
    pub issued_at: DateTime<Utc>,
    /// Unique per (certificate, user), immutable once issued.
    pub code: String,
    pub grade: Option<CourseGrade>,
    /// Names of the user's groups in the course, in retrieval order.
    pub group_names: Vec<String>,
}

impl IssueRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Column an issue listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    FullName,
    LastName,
    FirstName,
    IssuedAt,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort specification, e.g. `lastname DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssueSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FromStr for IssueSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let field = match parts.next().map(str::to_lowercase).as_deref() {
            None | Some("fullname") => SortField::FullName,
            Some("lastname") => SortField::LastName,
            Some("firstname") => SortField::FirstName,
            Some("issued_at") | Some("timecreated") | Some("date") => SortField::IssuedAt,
            Some("code") => SortField::Code,
            Some(other) => return Err(format!("Unknown sort column: {}", other)),
        };
        let direction = match parts.next().map(str::to_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => return Err(format!("Unknown sort direction: {}", other)),
        };
        if parts.next().is_some() {
            return Err(format!("Invalid sort specification: {}", s));
        }
        Ok(IssueSort { field, direction })
    }
}

impl IssueSort {
    /// Parses a sort parameter, falling back to full-name order.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse::<IssueSort>().ok())
            .unwrap_or_default()
    }

    /// Orders two records; ties are broken by issue id so the order is stable.
    pub fn compare(&self, a: &IssueRecord, b: &IssueRecord) -> Ordering {
        let key = |r: &IssueRecord| -> (String, String) {
            match self.field {
                SortField::FullName => (r.first_name.to_lowercase(), r.last_name.to_lowercase()),
                SortField::LastName => (r.last_name.to_lowercase(), String::new()),
                SortField::FirstName => (r.first_name.to_lowercase(), String::new()),
                SortField::IssuedAt => (r.issued_at.to_rfc3339(), String::new()),
                SortField::Code => (r.code.clone(), String::new()),
            }
        };
        let ordering = key(a).cmp(&key(b));
        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then(a.issue_id.cmp(&b.issue_id))
    }
}

/// Which users' records the caller may see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupScope {
    #[default]
    All,
    /// Only users belonging to at least one of these groups.
    Groups(Vec<i64>),
}

impl GroupScope {
    /// Returns true if a user with the given group ids is visible.
    pub fn admits(&self, user_group_ids: &[i64]) -> bool {
        match self {
            GroupScope::All => true,
            GroupScope::Groups(allowed) => user_group_ids.iter().any(|g| allowed.contains(g)),
        }
    }

    pub fn group_ids(&self) -> Option<&[i64]> {
        match self {
            GroupScope::All => None,
            GroupScope::Groups(ids) => Some(ids),
        }
    }
}

/// Inclusive calendar-day bounds on the issue timestamp (UTC days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A range whose start lies after its end matches nothing.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    /// First instant included by the range.
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.start
            .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
    }

    /// First instant after the range (midnight following the end day).
    pub fn upper_bound_exclusive(&self) -> Option<DateTime<Utc>> {
        self.end
            .and_then(|d| d.succ_opt())
            .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if self.is_inverted() {
            return false;
        }
        let after_start = self.lower_bound().map_or(true, |lower| at >= lower);
        let before_end = self.upper_bound_exclusive().map_or(true, |upper| at < upper);
        after_start && before_end
    }
}

/// Query against the issue store.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFilter {
    pub certificate_id: i64,
    pub course_id: i64,
    pub sort: IssueSort,
    pub scope: GroupScope,
    pub window: PageWindow,
    pub date_range: DateRange,
}

impl IssueFilter {
    /// True when the filter can be answered as empty without a query.
    pub fn matches_nothing(&self) -> bool {
        self.date_range.is_inverted()
            || matches!(&self.scope, GroupScope::Groups(ids) if ids.is_empty())
    }
}

/// One consistent read of the issue store: the requested page and the total
/// number of records matching the filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssueSnapshot {
    pub records: Vec<IssueRecord>,
    pub total: i64,
}

impl IssueSnapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
