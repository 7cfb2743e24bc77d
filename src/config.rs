//! Configuration for pdfbind.
//!
//! The CLI layer parses arguments (with environment fallbacks) and converts
//! them into one of the validated configurations below. The constants are the
//! fixed parts of the upload protocol shared by client and server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PdfBindError, Result};

/// Media type identifying PDF uploads.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Multipart field name carrying each uploaded file.
pub const UPLOAD_FIELD: &str = "pdfs";

/// Multipart field name carrying the requested output filename.
pub const FILENAME_FIELD: &str = "filename";

/// Response header carrying the number of inputs whose pages were merged.
pub const FILES_MERGED_HEADER: &str = "x-merge-files-merged";

/// Response header carrying the number of skipped inputs.
pub const FILES_SKIPPED_HEADER: &str = "x-merge-files-skipped";

/// Response header carrying the page count of the merged document.
pub const PAGES_HEADER: &str = "x-merge-pages";

/// Base name used when the user leaves the output name blank.
pub const DEFAULT_OUTPUT_BASE: &str = "merged-document";

/// Filename advertised by the server when the client requests none.
pub const SERVER_DEFAULT_FILENAME: &str = "merged.pdf";

/// Per-batch cap of the directory listing capability.
pub const DEFAULT_BATCH_CAP: usize = 100;

/// Maximum directory nesting the scanner descends into.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Delay before the submit control returns to idle after a success.
pub const DEFAULT_SUCCESS_RESET: Duration = Duration::from_millis(2000);

/// Default listen address of the merge service.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Default upload body limit (256 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Configuration of the merge service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen_addr: SocketAddr,

    /// Directory of static assets served at `/`, if any.
    pub static_dir: Option<PathBuf>,

    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,

    /// Compress the merged output before returning it.
    pub compress: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            compress: true,
        }
    }
}

impl ServerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The upload limit is zero
    /// - The static directory does not exist or is not a directory
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(PdfBindError::invalid_config(
                "Upload limit must be at least 1 byte",
            ));
        }

        if let Some(dir) = &self.static_dir
            && !dir.is_dir()
        {
            return Err(PdfBindError::invalid_config(format!(
                "Static directory does not exist: {}",
                dir.display()
            )));
        }

        Ok(())
    }
}

/// Configuration of the combining client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Files, folders or glob patterns, in drop order.
    pub inputs: Vec<String>,

    /// Base URL of the merge service.
    pub server_url: String,

    /// Output name typed by the user (may be blank).
    pub output_name: String,

    /// Directory the merged document is saved into.
    pub output_dir: PathBuf,

    /// Selection indices to remove before submitting.
    pub remove: Vec<usize>,

    /// Per-batch cap used when listing directories.
    pub batch_cap: usize,

    /// Delay before the submit control resets after success.
    pub success_reset: Duration,

    /// Show the selection without uploading.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            server_url: format!("http://{DEFAULT_LISTEN_ADDR}"),
            output_name: String::new(),
            output_dir: PathBuf::from("."),
            remove: Vec::new(),
            batch_cap: DEFAULT_BATCH_CAP,
            success_reset: DEFAULT_SUCCESS_RESET,
            dry_run: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl ClientConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No inputs are specified
    /// - Verbose and quiet modes are both enabled
    /// - The batch cap is zero
    /// - The server URL is not http(s)
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfBindError::invalid_config("No input files specified"));
        }

        if self.verbose && self.quiet {
            return Err(PdfBindError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if self.batch_cap == 0 {
            return Err(PdfBindError::invalid_config(
                "Batch size must be at least 1",
            ));
        }

        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(PdfBindError::invalid_config(format!(
                "Server URL must start with http:// or https://: {}",
                self.server_url
            )));
        }

        Ok(())
    }
}
