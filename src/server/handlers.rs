use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{
    DEFAULT_OUTPUT_BASE, FILENAME_FIELD, FILES_MERGED_HEADER, FILES_SKIPPED_HEADER,
    PAGES_HEADER, PDF_MEDIA_TYPE, SERVER_DEFAULT_FILENAME, UPLOAD_FIELD,
};
use crate::merge::{MergeInput, MergeRequest};
use crate::transport::{content_disposition, derive_output_filename};

use super::AppState;
use super::error::ApiError;

/// Name used for a file part that carries no filename.
const UNNAMED_UPLOAD: &str = "upload.pdf";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /merge`
///
/// Reads every `pdfs` part in order, merges them off the async runtime and
/// answers with the merged document as an attachment.
pub async fn merge(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut request = MergeRequest::new();
    let mut requested_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name == UPLOAD_FIELD {
            let name = field.file_name().unwrap_or(UNNAMED_UPLOAD).to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            request.push(MergeInput {
                name,
                content_type,
                bytes,
            });
        } else if field_name == FILENAME_FIELD {
            requested_name = Some(field.text().await?);
        } else {
            debug!(field = %field_name, "ignoring unknown multipart field");
        }
    }

    if request.is_empty() {
        return Err(ApiError::NoFiles);
    }

    info!(files = request.len(), "merge request received");

    let merger = state.merger.clone();
    let outcome = tokio::task::spawn_blocking(move || merger.merge(&request)).await??;

    let filename = requested_name
        .map(|name| derive_output_filename(&name, DEFAULT_OUTPUT_BASE))
        .unwrap_or_else(|| SERVER_DEFAULT_FILENAME.to_string());
    let disposition = content_disposition(&filename);

    let mut response = (StatusCode::OK, outcome.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PDF_MEDIA_TYPE));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers.insert(FILES_MERGED_HEADER, HeaderValue::from(outcome.report.merged_count()));
    headers.insert(FILES_SKIPPED_HEADER, HeaderValue::from(outcome.report.skipped_count()));
    headers.insert(PAGES_HEADER, HeaderValue::from(outcome.statistics.total_pages));

    Ok(response)
}
