//! Certificate report endpoint.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use domain::models::{DateRange, ExportArtifact, ExportFormat, ExportRequest, IssueSort};
use serde::Deserialize;
use shared::filename::content_disposition;
use shared::pagination::{clamp_per_page, PageWindow};
use shared::validation::parse_report_date;
use validator::Validate;

use crate::app::AppState;
use crate::config::ReportConfig;
use crate::error::ApiError;
use crate::extractors::AuthenticatedCaller;
use crate::services::export::TEXT_EXPORT_HEADERS;
use crate::services::{ReportOutcome, ReportService};

/// Query parameters of `GET /api/v1/certificates/:certificate_id/report`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReportQuery {
    #[validate(custom(function = "shared::validation::validate_sort"))]
    pub sort: Option<String>,

    /// `""`, `ods`, `xls`, `txt` or `zip`.
    pub download: Option<String>,

    /// Accepted for link compatibility; has no effect.
    pub action: Option<String>,

    pub start: Option<String>,

    pub end: Option<String>,

    #[validate(range(min = 0, message = "page must not be negative"))]
    pub page: Option<i64>,

    pub perpage: Option<i64>,

    /// Selected group; only used when the certificate has a group mode.
    pub group: Option<i64>,
}

impl ReportQuery {
    pub fn into_request(
        self,
        certificate_id: i64,
        config: &ReportConfig,
    ) -> Result<ExportRequest, ApiError> {
        self.validate()?;

        let format = ExportFormat::from_download_param(self.download.as_deref())
            .map_err(|value| ApiError::Validation(format!("Unknown download format '{}'", value)))?;
        let date_range = DateRange::new(
            parse_report_date(self.start.as_deref())?,
            parse_report_date(self.end.as_deref())?,
        );
        let per_page = clamp_per_page(self.perpage, config.per_page, config.max_per_page);

        Ok(ExportRequest {
            certificate_id,
            format,
            sort: IssueSort::parse_lenient(self.sort.as_deref()),
            date_range,
            window: PageWindow::new(self.page.unwrap_or(0), per_page),
            selected_group: self.group,
        })
    }
}

/// Renders the issue table, the empty notice, or streams an export.
pub async fn get_report(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(certificate_id): Path<i64>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let request = query.into_request(certificate_id, &state.config.report)?;
    let service = ReportService::new(&state.stores, &state.config.report);

    let outcome = service
        .run(&caller, &request, Utc::now().date_naive())
        .await?;

    Ok(match outcome {
        ReportOutcome::Empty(view) => Json(view).into_response(),
        ReportOutcome::Table(view) => Json(view).into_response(),
        ReportOutcome::Export(artifact) => export_response(artifact),
    })
}

/// Builds the download response for a finished export.
pub fn export_response(artifact: ExportArtifact) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type()),
    );
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&artifact.filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if artifact.format == ExportFormat::Text {
        for (name, value) in TEXT_EXPORT_HEADERS {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
    }

    (headers, artifact.body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> ReportConfig {
        ReportConfig::default()
    }

    #[test]
    fn test_defaults() {
        let request = ReportQuery::default().into_request(5, &config()).unwrap();
        assert_eq!(request.format, None);
        assert_eq!(request.window, PageWindow::new(0, 30));
        assert_eq!(request.sort, IssueSort::default());
        assert_eq!(request.date_range, DateRange::default());
    }

    #[test]
    fn test_full_query() {
        let query = ReportQuery {
            sort: Some("lastname desc".to_string()),
            download: Some("txt".to_string()),
            start: Some("2024-01-01".to_string()),
            end: Some("2024-01-31".to_string()),
            page: Some(2),
            perpage: Some(10),
            group: Some(4),
            ..Default::default()
        };
        let request = query.into_request(5, &config()).unwrap();
        assert_eq!(request.format, Some(ExportFormat::Text));
        assert_eq!(request.date_range.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(request.window, PageWindow::new(2, 10));
        assert_eq!(request.selected_group, Some(4));
        assert!(request.effective_window().is_unpaged());
    }

    #[test]
    fn test_unknown_download_rejected() {
        let query = ReportQuery {
            download: Some("pdf".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_request(5, &config()),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_date_rejected() {
        let query = ReportQuery {
            start: Some("01/02/2024".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_request(5, &config()),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_negative_page_rejected() {
        let query = ReportQuery {
            page: Some(-1),
            ..Default::default()
        };
        assert!(query.into_request(5, &config()).is_err());
    }

    #[test]
    fn test_unknown_sort_falls_back() {
        let query = ReportQuery {
            sort: Some("email".to_string()),
            ..Default::default()
        };
        let request = query.into_request(5, &config()).unwrap();
        assert_eq!(request.sort, IssueSort::default());
    }

    #[test]
    fn test_text_export_headers() {
        let response = export_response(ExportArtifact {
            format: ExportFormat::Text,
            filename: "01032024_Completion.txt".to_string(),
            body: b"x\n".to_vec(),
        });
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/download");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"01032024_Completion.txt\""
        );
        assert_eq!(headers["pragma"], "public");
        assert_eq!(headers["expires"], "0");
    }

    #[test]
    fn test_zip_export_has_no_cache_headers() {
        let response = export_response(ExportArtifact {
            format: ExportFormat::Archive,
            filename: "a.zip".to_string(),
            body: vec![],
        });
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert!(response.headers().get("pragma").is_none());
    }
}
