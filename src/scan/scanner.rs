//! Depth-first walk over a drop payload.
//!
//! The walk is an explicit work-queue loop rather than recursion: every opened
//! directory pushes a frame holding its listing cursor and the children of the
//! batch currently being visited. The top frame is always drained (including
//! every subtree it opens) before the next batch of the same directory is
//! requested, which yields a strict pre-order that never interleaves subtrees.

use std::collections::VecDeque;
use tracing::{debug, warn};

use super::{Entry, EntrySource, FileHandle, SourceEntry};
use crate::config::DEFAULT_MAX_DEPTH;

/// Options controlling a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum directory nesting below a top-level entry.
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// An entry that could not be resolved or listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    /// Label of the failing entry.
    pub entry: String,
    /// Why it failed.
    pub reason: String,
}

/// Summary of a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of leaf files resolved and handed to the sink.
    pub files_found: usize,
    /// Number of directories opened.
    pub directories_visited: usize,
    /// Number of listing batches read (including the final empty one).
    pub batches_read: usize,
    /// Entries skipped because they failed to resolve.
    pub failures: Vec<ScanFailure>,
}

/// One level of the walk.
struct Frame<C, E> {
    /// Listing cursor; `None` for the synthetic top-level frame.
    cursor: Option<C>,
    /// Label of the directory, for failure reports.
    label: String,
    /// Children of the current batch not yet visited.
    pending: VecDeque<E>,
}

/// Walks drop payloads and emits leaf files in pre-order.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Create a scanner with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with custom options.
    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Walk `roots` in order, calling `sink` for every resolved leaf file.
    ///
    /// Leaves are delivered as soon as they resolve, so the caller can update
    /// its state while the walk is still running. Entries that fail to resolve
    /// are recorded in the returned report and skipped; they never stop the
    /// walk of their siblings or ancestors.
    pub async fn scan<S, F>(&self, source: &S, roots: Vec<SourceEntry<S>>, mut sink: F) -> ScanReport
    where
        S: EntrySource,
        F: FnMut(FileHandle),
    {
        let mut report = ScanReport::default();
        let mut stack: Vec<Frame<S::Cursor, SourceEntry<S>>> = vec![Frame {
            cursor: None,
            label: String::new(),
            pending: roots.into(),
        }];

        while let Some(frame) = stack.last_mut() {
            if let Some(entry) = frame.pending.pop_front() {
                let label = source.describe(&entry);
                match entry {
                    Entry::File(file) => match source.resolve_file(&file).await {
                        Ok(handle) => {
                            debug!(entry = %label, size = handle.size(), "resolved file");
                            report.files_found += 1;
                            sink(handle);
                        }
                        Err(err) => Self::skip(&mut report, label, err.to_string()),
                    },
                    Entry::Directory(dir) => {
                        // The synthetic root frame does not count as a level.
                        if stack.len() > self.options.max_depth {
                            Self::skip(&mut report, label, "maximum directory depth exceeded".into());
                            continue;
                        }
                        match source.open_directory(&dir).await {
                            Ok(cursor) => {
                                report.directories_visited += 1;
                                stack.push(Frame {
                                    cursor: Some(cursor),
                                    label,
                                    pending: VecDeque::new(),
                                });
                            }
                            Err(err) => Self::skip(&mut report, label, err.to_string()),
                        }
                    }
                }
                continue;
            }

            let Some(cursor) = frame.cursor.as_mut() else {
                stack.pop();
                continue;
            };

            match source.read_entries(cursor).await {
                Ok(batch) => {
                    report.batches_read += 1;
                    if batch.is_empty() {
                        stack.pop();
                    } else {
                        debug!(directory = %frame.label, entries = batch.len(), "read batch");
                        frame.pending.extend(batch);
                    }
                }
                Err(err) => {
                    let label = std::mem::take(&mut frame.label);
                    stack.pop();
                    Self::skip(&mut report, label, err.to_string());
                }
            }
        }

        report
    }

    fn skip(report: &mut ScanReport, entry: String, reason: String) {
        warn!(entry = %entry, reason = %reason, "skipping unreadable entry");
        report.failures.push(ScanFailure { entry, reason });
    }
}
