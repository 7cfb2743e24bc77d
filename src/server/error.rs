//! Mapping failures to HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::PdfBindError;

/// Body of the 400 response for a request without file parts.
pub const NO_FILES_MESSAGE: &str = "No files uploaded.";

/// Body of every 500 response. Internal details stay in the log.
pub const MERGE_FAILED_MESSAGE: &str = "Error merging PDFs";

/// Errors a request handler can end with.
#[derive(Debug)]
pub enum ApiError {
    /// The request carried no file parts.
    NoFiles,
    /// The multipart body could not be read.
    Multipart(MultipartError),
    /// The merge itself failed.
    Merge(PdfBindError),
    /// The merge task panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<PdfBindError> for ApiError {
    fn from(err: PdfBindError) -> Self {
        match err {
            PdfBindError::NoFilesToMerge => Self::NoFiles,
            other => Self::Merge(other),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NoFiles => (StatusCode::BAD_REQUEST, NO_FILES_MESSAGE).into_response(),
            Self::Multipart(err) => {
                let status = err.status();
                if status.is_server_error() {
                    error!("multipart read failed: {err}");
                    return (StatusCode::INTERNAL_SERVER_ERROR, MERGE_FAILED_MESSAGE)
                        .into_response();
                }
                (status, err.body_text()).into_response()
            }
            Self::Merge(err) => {
                error!("merge failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, MERGE_FAILED_MESSAGE).into_response()
            }
            Self::Task(err) => {
                error!("merge task failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, MERGE_FAILED_MESSAGE).into_response()
            }
        }
    }
}
