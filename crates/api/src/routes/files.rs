//! Single certificate file download.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use shared::filename::{content_disposition, sanitize_filename};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthenticatedCaller;
use crate::services::ReportService;

/// Streams one issued PDF of a certificate the caller may manage.
pub async fn get_certificate_file(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path((certificate_id, file_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    ReportService::new(&state.stores, &state.config.report)
        .authorize(&caller, certificate_id)
        .await?;

    let not_found = || ApiError::NotFound("File not found".to_string());

    let file = state
        .stores
        .attachments
        .find_file(file_id)
        .await?
        .filter(|f| f.certificate_id == certificate_id && f.is_generated())
        .ok_or_else(not_found)?;

    let content = state
        .stores
        .attachments
        .fetch_content(file.file_id)
        .await?
        .filter(|c| !c.is_empty())
        .ok_or_else(not_found)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&sanitize_filename(&file.file_name))) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, content).into_response())
}
