//! Error types for pdfbind.
//!
//! Errors fall into two groups. Per-item failures (an unreadable directory
//! entry, a file that does not parse as PDF) are recoverable: the surrounding
//! scan or merge records them and moves on. Structural failures (an empty
//! batch, a failed final serialization, a broken transport) abort the whole
//! operation.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfbind operations.
pub type Result<T> = std::result::Result<T, PdfBindError>;

/// Main error type for pdfbind operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfBindError {
    /// A dropped entry could not be resolved to a file or listed as a directory.
    #[error("Cannot read entry: {entry}\n  Reason: {reason}")]
    EntryUnreadable {
        /// Label of the entry (usually its path).
        entry: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Input path was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Uploaded bytes could not be parsed as a PDF document.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Original file name of the upload.
        name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted and cannot be processed: {name}")]
    EncryptedPdf {
        /// Original file name of the upload.
        name: String,
    },

    /// No files were provided for merging.
    #[error("No PDF files to merge")]
    NoFilesToMerge,

    /// Index-based removal outside of `0..len`.
    #[error("Invalid selection index {index} (selection has {len} item(s))")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Length of the selection at the time of the request.
        len: usize,
    },

    /// Page tree manipulation failed while composing the output.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// The composed document could not be serialized.
    #[error("Failed to serialize merged PDF: {reason}")]
    SerializationFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// The merge service answered with a non-success status.
    #[error("Merge service returned {status}: {message}")]
    ServerRejected {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The request could not reach the merge service.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfBindError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl PdfBindError {
    /// Create an EntryUnreadable error.
    pub fn entry_unreadable(entry: impl Into<String>, reason: impl ToString) -> Self {
        Self::EntryUnreadable {
            entry: entry.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a SerializationFailed error.
    pub fn serialization_failed(reason: impl ToString) -> Self {
        Self::SerializationFailed {
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single item of a batch.
    ///
    /// Recoverable errors are recorded and skipped; the scan or merge
    /// continues with the remaining items.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EntryUnreadable { .. }
                | Self::FileNotFound { .. }
                | Self::FailedToLoadPdf { .. }
                | Self::EncryptedPdf { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoFilesToMerge
                | Self::MergeFailed { .. }
                | Self::SerializationFailed { .. }
                | Self::ServerRejected { .. }
                | Self::Transport(_)
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EntryUnreadable { .. } => 2,
            Self::FileNotFound { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::NoFilesToMerge => 1,
            Self::InvalidIndex { .. } => 1,
            Self::MergeFailed { .. } => 6,
            Self::SerializationFailed { .. } => 6,
            Self::ServerRejected { .. } => 7,
            Self::Transport(_) => 7,
            Self::InvalidConfig { .. } => 1,
            Self::Io(_) => 5,
            Self::Other { .. } => 1,
        }
    }
}
