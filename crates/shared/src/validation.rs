//! Report parameter validation.

use chrono::NaiveDate;
use validator::ValidationError;

/// Wire format of the `start` / `end` filter parameters.
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an optional `YYYY-MM-DD` filter bound.
///
/// Missing and blank values mean "no bound" (the filter form submits empty
/// inputs when a bound is cleared).
pub fn parse_report_date(value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, REPORT_DATE_FORMAT)
        .map(Some)
        .map_err(|_| {
            let mut err = ValidationError::new("report_date");
            err.message = Some(format!("Invalid date '{}' (expected YYYY-MM-DD)", raw).into());
            err
        })
}

/// Validates a sort specification is short and printable.
pub fn validate_sort(sort: &str) -> Result<(), ValidationError> {
    if sort.len() <= 64 && sort.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ') {
        Ok(())
    } else {
        let mut err = ValidationError::new("sort");
        err.message = Some("Sort must be a column name optionally followed by ASC or DESC".into());
        Err(err)
    }
}
