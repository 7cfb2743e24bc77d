//! The ordered selection of candidate PDF files.
//!
//! A [`Selection`] owns the list of files the user intends to combine. Files
//! enter through [`Selection::add`], which applies the admission filter and
//! records the outcome. Every mutation rebuilds a complete [`SelectionView`]
//! and publishes it on a watch channel; views are never patched in place.
//!
//! # Examples
//!
//! ```
//! use pdfbind::scan::FileHandle;
//! use pdfbind::selection::{Admission, Selection};
//!
//! let mut selection = Selection::new();
//! let view = selection.subscribe();
//!
//! selection.add(FileHandle::from_bytes("a.pdf", None, Vec::<u8>::new()));
//! let rejected = selection.add(FileHandle::from_bytes("a.txt", Some("text/plain"), Vec::<u8>::new()));
//!
//! assert!(matches!(rejected, Admission::Rejected(_)));
//! assert_eq!(view.borrow().submit_label, "Combine 1 PDFs");
//! ```

use std::fmt;
use tokio::sync::watch;
use tracing::debug;

use crate::config::PDF_MEDIA_TYPE;
use crate::error::{PdfBindError, Result};
use crate::scan::FileHandle;

/// Why a candidate was kept out of the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Neither the media type nor the extension indicates a PDF.
    NotPdf {
        /// Declared media type of the candidate.
        media_type: Option<String>,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPdf {
                media_type: Some(media_type),
            } => write!(f, "not a PDF (declared type {media_type})"),
            Self::NotPdf { media_type: None } => write!(f, "not a PDF"),
        }
    }
}

/// Outcome of offering a candidate to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The candidate was appended at `index`.
    Accepted {
        /// Position of the new item.
        index: usize,
    },
    /// The candidate was dropped.
    Rejected(RejectReason),
}

impl Admission {
    /// Whether the candidate entered the selection.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// One admission decision, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionRecord {
    /// Name of the candidate.
    pub name: String,
    /// What happened to it.
    pub admission: Admission,
}

/// Every admission decision made since the selection was created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionReport {
    records: Vec<AdmissionRecord>,
}

impl AdmissionReport {
    /// All records, in the order candidates were offered.
    pub fn records(&self) -> &[AdmissionRecord] {
        &self.records
    }

    /// Number of accepted candidates.
    pub fn accepted(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.admission.is_accepted())
            .count()
    }

    /// Rejected candidates with their reasons.
    pub fn rejected(&self) -> impl Iterator<Item = (&str, &RejectReason)> {
        self.records.iter().filter_map(|r| match &r.admission {
            Admission::Rejected(reason) => Some((r.name.as_str(), reason)),
            Admission::Accepted { .. } => None,
        })
    }
}

/// Derived presentation state of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionView {
    /// Number of selected files.
    pub len: usize,
    /// Whether the empty-state view is shown.
    pub is_empty: bool,
    /// Item count label, e.g. "3 files".
    pub count_label: String,
    /// Whether the submit control accepts input.
    pub submit_enabled: bool,
    /// Label of the submit control when idle.
    pub submit_label: String,
}

impl SelectionView {
    /// Compute the view for a selection of `len` items.
    pub fn for_len(len: usize) -> Self {
        let plural = if len == 1 { "" } else { "s" };
        Self {
            len,
            is_empty: len == 0,
            count_label: format!("{len} file{plural}"),
            submit_enabled: len > 0,
            submit_label: submit_label(len),
        }
    }
}

/// Label of the idle submit control for `len` selected files.
pub fn submit_label(len: usize) -> String {
    if len == 0 {
        "Combine PDFs".to_string()
    } else {
        format!("Combine {len} PDFs")
    }
}

/// Whether a candidate passes the admission filter.
pub fn is_pdf_candidate(handle: &FileHandle) -> bool {
    handle.media_type() == Some(PDF_MEDIA_TYPE) || has_pdf_extension(handle.name())
}

fn has_pdf_extension(name: &str) -> bool {
    name.len() >= 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"))
}

/// Ordered, filtered list of files to combine.
#[derive(Debug)]
pub struct Selection {
    items: Vec<FileHandle>,
    report: AdmissionReport,
    view: watch::Sender<SelectionView>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        let (view, _) = watch::channel(SelectionView::for_len(0));
        Self {
            items: Vec::new(),
            report: AdmissionReport::default(),
            view,
        }
    }

    /// Offer a candidate; PDFs are appended, anything else is dropped.
    ///
    /// Duplicates are allowed: the same file may be selected more than once.
    pub fn add(&mut self, handle: FileHandle) -> Admission {
        let name = handle.name().to_string();

        let admission = if is_pdf_candidate(&handle) {
            self.items.push(handle);
            Admission::Accepted {
                index: self.items.len() - 1,
            }
        } else {
            Admission::Rejected(RejectReason::NotPdf {
                media_type: handle.media_type().map(str::to_string),
            })
        };

        debug!(name = %name, ?admission, "admission");
        self.report.records.push(AdmissionRecord {
            name,
            admission: admission.clone(),
        });

        if admission.is_accepted() {
            self.publish();
        }
        admission
    }

    /// Remove the item at `index`; later items shift down by one.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::InvalidIndex`] unless `index < len`.
    pub fn remove_at(&mut self, index: usize) -> Result<FileHandle> {
        if index >= self.items.len() {
            return Err(PdfBindError::InvalidIndex {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.publish();
        Ok(removed)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.publish();
    }

    /// Read-only ordered view of the items.
    pub fn items(&self) -> &[FileHandle] {
        &self.items
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Admission decisions made so far.
    pub fn report(&self) -> &AdmissionReport {
        &self.report
    }

    /// Current presentation state.
    pub fn view(&self) -> SelectionView {
        self.view.borrow().clone()
    }

    /// Subscribe to presentation state changes.
    pub fn subscribe(&self) -> watch::Receiver<SelectionView> {
        self.view.subscribe()
    }

    fn publish(&self) {
        self.view.send_replace(SelectionView::for_len(self.items.len()));
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}
