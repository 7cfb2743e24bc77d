//! Parsing uploaded bytes into PDF documents.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::io::PdfReader;
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load_bytes("report.pdf", bytes)?;
//! println!("{} has {} pages", loaded.name, loaded.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::time::{Duration, Instant};

use crate::error::{PdfBindError, Result};

/// A parsed PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Original file name of the upload.
    pub name: String,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to parse the document.
    pub load_time: Duration,

    /// Size of the uploaded bytes.
    pub byte_size: u64,
}

/// PDF reader for in-memory uploads. Encrypted documents are rejected.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single document from memory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are not a valid PDF
    /// - The PDF is encrypted
    pub fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<LoadedPdf> {
        let start = Instant::now();

        let document = Document::load_mem(bytes).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("encrypt") || err_msg.contains("password") {
                PdfBindError::EncryptedPdf {
                    name: name.to_string(),
                }
            } else {
                PdfBindError::failed_to_load_pdf(name, err_msg)
            }
        })?;

        if document.is_encrypted() {
            return Err(PdfBindError::EncryptedPdf {
                name: name.to_string(),
            });
        }

        let page_count = document.get_pages().len();

        Ok(LoadedPdf {
            document,
            name: name.to_string(),
            page_count,
            load_time: start.elapsed(),
            byte_size: bytes.len() as u64,
        })
    }
}
