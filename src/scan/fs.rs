//! Filesystem-backed entry source.
//!
//! Directory listings are read eagerly with `tokio::fs`, sorted by file name
//! so the walk is deterministic on every platform, and then handed out in
//! batches of at most `batch_cap` children to mirror a paginated listing API.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Entry, EntrySource, FileHandle, SourceEntry};
use crate::error::{PdfBindError, Result};

/// Listing position inside an opened directory.
#[derive(Debug)]
pub struct FsCursor {
    children: std::vec::IntoIter<SourceEntry<FsEntrySource>>,
}

/// [`EntrySource`] reading from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsEntrySource {
    batch_cap: usize,
}

impl FsEntrySource {
    /// Create a source that lists at most `batch_cap` children per batch.
    pub fn new(batch_cap: usize) -> Self {
        Self {
            batch_cap: batch_cap.max(1),
        }
    }

    /// Classify top-level paths as files or directories, keeping their order.
    ///
    /// Paths whose metadata cannot be read are classified as files so that
    /// the failure is reported when the scanner tries to resolve them.
    pub async fn entries_for(&self, paths: &[PathBuf]) -> Vec<SourceEntry<Self>> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            entries.push(classify(path.clone()).await);
        }
        entries
    }
}

async fn classify(path: PathBuf) -> SourceEntry<FsEntrySource> {
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => Entry::Directory(path),
        _ => Entry::File(path),
    }
}

fn unreadable(path: &Path, err: impl ToString) -> PdfBindError {
    PdfBindError::entry_unreadable(path.display().to_string(), err)
}

impl EntrySource for FsEntrySource {
    type File = PathBuf;
    type Directory = PathBuf;
    type Cursor = FsCursor;

    fn describe(&self, entry: &SourceEntry<Self>) -> String {
        match entry {
            Entry::File(path) | Entry::Directory(path) => path.display().to_string(),
        }
    }

    async fn resolve_file(&self, file: &PathBuf) -> Result<FileHandle> {
        let meta = tokio::fs::metadata(file).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                PdfBindError::FileNotFound { path: file.clone() }
            } else {
                unreadable(file, err)
            }
        })?;

        if !meta.is_file() {
            return Err(unreadable(file, "not a regular file"));
        }

        Ok(FileHandle::from_path(file.clone(), meta.len()))
    }

    async fn open_directory(&self, dir: &PathBuf) -> Result<FsCursor> {
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|err| unreadable(dir, err))?;

        let mut paths = Vec::new();
        while let Some(child) = reader
            .next_entry()
            .await
            .map_err(|err| unreadable(dir, err))?
        {
            paths.push(child.path());
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut children = Vec::with_capacity(paths.len());
        for path in paths {
            children.push(classify(path).await);
        }

        debug!(directory = %dir.display(), children = children.len(), "opened directory");

        Ok(FsCursor {
            children: children.into_iter(),
        })
    }

    async fn read_entries(&self, cursor: &mut FsCursor) -> Result<Vec<SourceEntry<Self>>> {
        Ok(cursor.children.by_ref().take(self.batch_cap).collect())
    }
}
