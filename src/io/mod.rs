//! PDF reading and writing.
//!
//! Thin adapters over `lopdf`: [`reader::PdfReader`] parses uploaded bytes,
//! [`writer::PdfWriter`] serializes composed documents and saves downloads.

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
