//! Serializing composed documents and saving downloads.
//!
//! Merged documents never touch the disk on the server: [`PdfWriter::to_bytes`]
//! serializes into memory. On the client, [`PdfWriter::save_bytes`] stores a
//! received document with an atomic write (temp file, then rename).

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PdfBindError, Result};
use crate::transport::local_filename;

/// Options for serializing PDF documents.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compress streams before writing.
    pub compress: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Statistics about a serialization.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to serialize.
    pub write_time: Duration,

    /// Size of the output in bytes.
    pub byte_size: u64,

    /// Whether compression was applied.
    pub compressed: bool,
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer without compression (faster but larger output).
    pub fn without_compression() -> Self {
        Self {
            options: WriteOptions { compress: false },
        }
    }

    /// Serialize a document into memory.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::SerializationFailed`] if lopdf cannot write the
    /// document.
    pub fn to_bytes(&self, doc: &mut Document) -> Result<(Vec<u8>, WriteStatistics)> {
        let start = Instant::now();

        if self.options.compress {
            doc.compress();
        }

        doc.renumber_objects();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(PdfBindError::serialization_failed)?;

        let stats = WriteStatistics {
            write_time: start.elapsed(),
            byte_size: buffer.len() as u64,
            compressed: self.options.compress,
        };

        Ok((buffer, stats))
    }

    /// Save already-serialized bytes as `dir/filename`.
    ///
    /// `filename` is reduced to a single path component, so a name such as
    /// `"reports/q3.pdf"` or `"../q3.pdf"` still lands directly in `dir`.
    /// Missing parent directories are created. Returns the final path.
    pub async fn save_bytes(&self, dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(local_filename(filename));
        let write_path = path.with_extension("pdf.tmp");

        tokio::fs::write(&write_path, bytes).await?;
        tokio::fs::rename(&write_path, &path).await?;

        Ok(path)
    }
}


/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
