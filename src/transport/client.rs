//! HTTP client for the merge service and the submit flow around it.

use bytes::Bytes;
use futures::future::try_join_all;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use crate::config::{
    DEFAULT_OUTPUT_BASE, FILENAME_FIELD, FILES_MERGED_HEADER, FILES_SKIPPED_HEADER,
    PAGES_HEADER, PDF_MEDIA_TYPE, UPLOAD_FIELD,
};
use crate::error::{PdfBindError, Result};
use crate::merge::{MergeInput, MergeRequest};
use crate::selection::Selection;

use super::control::SubmitControl;
use super::filename::derive_output_filename;

/// Merged bytes returned by the service plus the counts it advertised.
#[derive(Debug, Clone)]
pub struct MergeResponse {
    pub bytes: Bytes,
    pub files_merged: Option<usize>,
    pub files_skipped: Option<usize>,
    pub pages: Option<usize>,
}

/// A finished download, ready to be saved.
#[derive(Debug, Clone)]
pub struct Download {
    /// Derived output filename.
    pub filename: String,
    /// Merged document bytes, as received.
    pub bytes: Bytes,
    /// Number of uploads the service skipped, if it said so.
    pub files_skipped: Option<usize>,
}

/// Thin reqwest wrapper speaking the `/merge` protocol.
#[derive(Debug, Clone)]
pub struct MergeClient {
    http: reqwest::Client,
    merge_url: String,
}

impl MergeClient {
    /// Create a client for the service at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pdfbind/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, base_url))
    }

    /// Create a client from a preconfigured reqwest client.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            merge_url: format!("{}/merge", base_url.trim_end_matches('/')),
        }
    }

    /// URL requests are posted to.
    pub fn merge_url(&self) -> &str {
        &self.merge_url
    }

    /// Upload `request` as one multipart body and return the merged document.
    ///
    /// Each input becomes a part under the `pdfs` field, in order. `filename`
    /// is sent as a separate text part.
    ///
    /// # Errors
    ///
    /// - [`PdfBindError::Transport`] if the service cannot be reached
    /// - [`PdfBindError::ServerRejected`] for any non-success status
    pub async fn merge(&self, request: &MergeRequest, filename: &str) -> Result<MergeResponse> {
        let mut form = Form::new().text(FILENAME_FIELD, filename.to_string());
        for input in request.inputs() {
            let content_type = input.content_type.as_deref().unwrap_or(PDF_MEDIA_TYPE);
            let part = Part::bytes(input.bytes.to_vec())
                .file_name(input.name.clone())
                .mime_str(content_type)?;
            form = form.part(UPLOAD_FIELD, part);
        }

        debug!(url = %self.merge_url, files = request.len(), "posting merge request");
        let response = self.http.post(&self.merge_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PdfBindError::ServerRejected {
                status: status.as_u16(),
                message,
            });
        }

        let header_count = |name: &str| -> Option<usize> {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
        };
        let files_merged = header_count(FILES_MERGED_HEADER);
        let files_skipped = header_count(FILES_SKIPPED_HEADER);
        let pages = header_count(PAGES_HEADER);

        Ok(MergeResponse {
            bytes: response.bytes().await?,
            files_merged,
            files_skipped,
            pages,
        })
    }
}

/// Runs one submission: freeze the selection, upload it, drive the control.
#[derive(Debug)]
pub struct Uploader {
    client: MergeClient,
    control: SubmitControl,
}

impl Uploader {
    pub fn new(client: MergeClient, control: SubmitControl) -> Self {
        Self { client, control }
    }

    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    /// Submit the current selection.
    ///
    /// An empty selection is a no-op and yields `Ok(None)`. Otherwise the
    /// selection order is frozen into a request, uploaded, and the response
    /// returned as a [`Download`] named after `requested_name`.
    ///
    /// On failure the control returns to idle immediately and the error is
    /// returned for the caller to surface.
    pub async fn submit(&self, selection: &Selection, requested_name: &str) -> Result<Option<Download>> {
        if selection.is_empty() || !self.control.begin() {
            debug!("submit ignored: nothing selected or submission in flight");
            return Ok(None);
        }

        let filename = derive_output_filename(requested_name, DEFAULT_OUTPUT_BASE);
        match self.upload(selection, &filename).await {
            Ok(response) => {
                info!(
                    filename = %filename,
                    bytes = response.bytes.len(),
                    merged = ?response.files_merged,
                    skipped = ?response.files_skipped,
                    "merge succeeded"
                );
                self.control.succeed();
                Ok(Some(Download {
                    filename,
                    bytes: response.bytes,
                    files_skipped: response.files_skipped,
                }))
            }
            Err(err) => {
                warn!("merge failed: {err}");
                self.control.fail(err.to_string());
                Err(err)
            }
        }
    }

    async fn upload(&self, selection: &Selection, filename: &str) -> Result<MergeResponse> {
        let request = freeze(selection).await?;
        self.client.merge(&request, filename).await
    }
}

/// Snapshot the selection, in order, into a merge request.
///
/// Files are read concurrently; the request keeps selection order.
pub async fn freeze(selection: &Selection) -> Result<MergeRequest> {
    let inputs = try_join_all(selection.items().iter().map(|handle| async move {
        let bytes = handle.read().await?;
        Ok::<_, PdfBindError>(MergeInput::new(
            handle.name(),
            Some(handle.media_type().unwrap_or(PDF_MEDIA_TYPE)),
            bytes,
        ))
    }))
    .await?;

    Ok(MergeRequest::from(inputs))
}
