//! Rundown upload endpoint
//!
//! POST /upload takes a multipart form with the rundown in `file` and an
//! optional `reset` field. The converted day is merged into the stored guide
//! (or into an empty guide when `reset=1`), persisted, and returned as a
//! download.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use sirava_common::xml::to_xml;
use sirava_common::{convert_rundown, merge_into_document, time, ScheduleDocument};
use chrono::Utc;
use tracing::info;

use crate::{ApiError, ApiResult, AppState, LastUpload};

/// Name offered to the browser for the returned guide
pub const DOWNLOAD_FILENAME: &str = "sirava.xml";

/// Largest accepted upload request body (replaces axum's 2 MB default)
pub const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Body limit layer for the upload route
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)
}

/// POST /upload
pub async fn upload_rundown(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut rundown = None;
    let mut reset = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Cannot read uploaded file: {}", e)))?;
                rundown = Some(bytes);
            }
            "reset" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Cannot read reset flag: {}", e)))?;
                reset = value.trim() == "1";
            }
            _ => {}
        }
    }

    let rundown = rundown.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    let conversion = convert_rundown(&rundown, time::today())?;
    info!(
        "Converted rundown for {}: {} entries (reset={})",
        conversion.date,
        conversion.entries.len(),
        reset
    );

    let date = conversion.date.clone();
    let entries = conversion.entries.len();

    // Single writer: hold the lock across load, merge and store
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    let xml = tokio::task::spawn_blocking(move || -> sirava_common::Result<Vec<u8>> {
        let base = if reset {
            ScheduleDocument::new()
        } else {
            store.load()
        };
        let doc = merge_into_document(base, &conversion.date, conversion.entries);
        let xml = to_xml(&doc)?;
        store.store(&xml)?;
        Ok(xml)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Upload task failed: {}", e)))??;

    *state.last_upload.write().await = Some(LastUpload {
        date,
        entries,
        at: Utc::now(),
    });

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/xml".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", DOWNLOAD_FILENAME),
            ),
        ],
        xml,
    ))
}
