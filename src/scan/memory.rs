//! In-memory drop payloads.
//!
//! Useful for embedding the scanner where entries do not come from the local
//! filesystem, and for exercising pagination and failure paths in tests.

use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Entry, EntrySource, FileHandle, SourceEntry};
use crate::config::PDF_MEDIA_TYPE;
use crate::error::{PdfBindError, Result};

/// Leaf node of an in-memory payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    path: String,
    media_type: Option<String>,
    bytes: Bytes,
    failure: Option<String>,
}

/// Directory node of an in-memory payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDir {
    path: String,
    children: Vec<MemoryEntry>,
    failure: Option<String>,
    /// Number of successful batches served before listing fails.
    fail_after: Option<(usize, String)>,
}

/// Entry of an in-memory payload.
pub type MemoryEntry = Entry<MemoryFile, MemoryDir>;

/// Listing position inside a [`MemoryDir`].
#[derive(Debug)]
pub struct MemoryCursor {
    children: Vec<MemoryEntry>,
    position: usize,
    batches: usize,
    fail_after: Option<(usize, String)>,
}

/// A leaf file with explicit media type.
pub fn file(name: &str, media_type: Option<&str>, bytes: impl Into<Bytes>) -> MemoryEntry {
    Entry::File(MemoryFile {
        path: name.to_string(),
        media_type: media_type.map(str::to_string),
        bytes: bytes.into(),
        failure: None,
    })
}

/// A leaf file declared as PDF, with placeholder contents.
pub fn pdf(name: &str) -> MemoryEntry {
    file(name, Some(PDF_MEDIA_TYPE), Bytes::from_static(b"%PDF-1.5\n"))
}

/// A leaf file that fails to resolve.
pub fn unreadable_file(name: &str, reason: &str) -> MemoryEntry {
    Entry::File(MemoryFile {
        path: name.to_string(),
        media_type: None,
        bytes: Bytes::new(),
        failure: Some(reason.to_string()),
    })
}

/// A directory with the given children, in listing order.
pub fn dir(name: &str, children: Vec<MemoryEntry>) -> MemoryEntry {
    Entry::Directory(MemoryDir {
        path: name.to_string(),
        children: children.into_iter().map(|c| prefixed(c, name)).collect(),
        failure: None,
        fail_after: None,
    })
}

/// A directory that cannot be opened.
pub fn unreadable_dir(name: &str, reason: &str) -> MemoryEntry {
    Entry::Directory(MemoryDir {
        path: name.to_string(),
        children: Vec::new(),
        failure: Some(reason.to_string()),
        fail_after: None,
    })
}

/// A directory whose listing fails after `batches` successful batches.
pub fn dir_failing_after(
    name: &str,
    children: Vec<MemoryEntry>,
    batches: usize,
    reason: &str,
) -> MemoryEntry {
    let mut entry = dir(name, children);
    if let Entry::Directory(d) = &mut entry {
        d.fail_after = Some((batches, reason.to_string()));
    }
    entry
}

fn prefixed(entry: MemoryEntry, parent: &str) -> MemoryEntry {
    match entry {
        Entry::File(mut f) => {
            f.path = format!("{parent}/{}", f.path);
            Entry::File(f)
        }
        Entry::Directory(mut d) => {
            d.path = format!("{parent}/{}", d.path);
            d.children = d
                .children
                .into_iter()
                .map(|c| prefixed(c, parent))
                .collect();
            Entry::Directory(d)
        }
    }
}

/// [`EntrySource`] over in-memory payloads with a fixed batch cap.
#[derive(Debug)]
pub struct MemoryEntrySource {
    batch_cap: usize,
    batches_served: AtomicUsize,
}

impl MemoryEntrySource {
    /// Create a source that lists at most `batch_cap` children per batch.
    pub fn new(batch_cap: usize) -> Self {
        Self {
            batch_cap: batch_cap.max(1),
            batches_served: AtomicUsize::new(0),
        }
    }

    /// Total number of `read_entries` calls answered so far.
    pub fn batches_served(&self) -> usize {
        self.batches_served.load(Ordering::Relaxed)
    }
}

impl EntrySource for MemoryEntrySource {
    type File = MemoryFile;
    type Directory = MemoryDir;
    type Cursor = MemoryCursor;

    fn describe(&self, entry: &SourceEntry<Self>) -> String {
        match entry {
            Entry::File(f) => f.path.clone(),
            Entry::Directory(d) => d.path.clone(),
        }
    }

    async fn resolve_file(&self, file: &MemoryFile) -> Result<FileHandle> {
        if let Some(reason) = &file.failure {
            return Err(PdfBindError::entry_unreadable(&file.path, reason));
        }
        let name = file.path.rsplit('/').next().unwrap_or(&file.path);
        Ok(FileHandle::from_bytes(
            name,
            file.media_type.as_deref(),
            file.bytes.clone(),
        ))
    }

    async fn open_directory(&self, dir: &MemoryDir) -> Result<MemoryCursor> {
        if let Some(reason) = &dir.failure {
            return Err(PdfBindError::entry_unreadable(&dir.path, reason));
        }
        Ok(MemoryCursor {
            children: dir.children.clone(),
            position: 0,
            batches: 0,
            fail_after: dir.fail_after.clone(),
        })
    }

    async fn read_entries(&self, cursor: &mut MemoryCursor) -> Result<Vec<MemoryEntry>> {
        self.batches_served.fetch_add(1, Ordering::Relaxed);

        if let Some((limit, reason)) = &cursor.fail_after
            && cursor.batches >= *limit
        {
            return Err(PdfBindError::other(reason.clone()));
        }

        let end = (cursor.position + self.batch_cap).min(cursor.children.len());
        let batch = cursor.children[cursor.position..end].to_vec();
        cursor.position = end;
        cursor.batches += 1;
        Ok(batch)
    }
}
