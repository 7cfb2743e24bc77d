//! Entry scanning: flattening a drop payload into ordered file handles.
//!
//! A drop payload is a mix of leaf files and directories. The scanner walks it
//! depth-first, in payload order, and hands every leaf it resolves to a sink as
//! soon as it is found. Directories are read through a paginated listing
//! capability ([`EntrySource`]) so the same walk drives the filesystem, an
//! in-memory tree, or anything else that can list children in batches.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::scan::{Scanner, fs::FsEntrySource};
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let source = FsEntrySource::new(100);
//! let roots = source.entries_for(&[PathBuf::from("reports")]).await;
//! let mut names = Vec::new();
//! let report = Scanner::new().scan(&source, roots, |file| names.push(file.name().to_string())).await;
//! println!("{} files, {} failures", report.files_found, report.failures.len());
//! # }
//! ```

pub mod fs;
pub mod memory;
pub mod scanner;

pub use scanner::{ScanFailure, ScanOptions, ScanReport, Scanner};

use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::config::PDF_MEDIA_TYPE;
use crate::error::Result;

/// Where the bytes behind a [`FileHandle`] live.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileSource {
    /// A file on the local filesystem, read lazily.
    Path(PathBuf),
    /// Bytes already held in memory.
    Memory(Bytes),
}

/// Immutable reference to a file's bytes plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    size: u64,
    media_type: Option<String>,
    source: FileSource,
}

impl FileHandle {
    /// Create a handle for a file on disk.
    ///
    /// The declared media type is inferred from the file extension.
    pub fn from_path(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for(&path).map(str::to_string);

        Self {
            name,
            size,
            media_type,
            source: FileSource::Path(path),
        }
    }

    /// Create a handle for bytes held in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            media_type: media_type.map(str::to_string),
            source: FileSource::Memory(bytes),
        }
    }

    /// File name, without any directory component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Declared media type, if any.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Read the file contents.
    pub async fn read(&self) -> Result<Bytes> {
        match &self.source {
            FileSource::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Media type implied by a file extension.
fn media_type_for(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("pdf"))
        .map(|_| PDF_MEDIA_TYPE)
}

/// A node of a drop payload: a leaf file or an enumerable directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<F, D> {
    /// Leaf file, resolvable to a [`FileHandle`].
    File(F),
    /// Directory whose children are listed in batches.
    Directory(D),
}

/// Entry type produced by a given [`EntrySource`].
pub type SourceEntry<S> = Entry<<S as EntrySource>::File, <S as EntrySource>::Directory>;

/// Platform capability for resolving files and listing directories.
///
/// `read_entries` returns at most one batch of children per call; an empty
/// batch means the directory is exhausted.
#[allow(async_fn_in_trait)]
pub trait EntrySource {
    /// Reference to a leaf file.
    type File;
    /// Reference to a directory.
    type Directory;
    /// Listing position inside an opened directory.
    type Cursor;

    /// Human-readable label for reports and logs.
    fn describe(&self, entry: &SourceEntry<Self>) -> String;

    /// Resolve a leaf entry to a file handle.
    async fn resolve_file(&self, file: &Self::File) -> Result<FileHandle>;

    /// Open a listing cursor for a directory.
    async fn open_directory(&self, dir: &Self::Directory) -> Result<Self::Cursor>;

    /// Read the next batch of children.
    async fn read_entries(&self, cursor: &mut Self::Cursor) -> Result<Vec<SourceEntry<Self>>>;
}
