//! Merging uploaded PDF documents into one.
//!
//! A [`MergeRequest`] carries the uploaded files in upload order. The
//! [`Merger`] copies every page of every file that parses, in order, into a
//! fresh [`pages::OutputDocument`]. Files that are not declared as PDF or
//! fail to parse are skipped and recorded in the [`MergeReport`].

mod merger;
pub mod pages;

pub use merger::Merger;

use bytes::Bytes;
use std::fmt;
use std::time::Duration;

use crate::config::PDF_MEDIA_TYPE;

/// A single uploaded file.
#[derive(Debug, Clone)]
pub struct MergeInput {
    /// Original file name.
    pub name: String,

    /// Declared content type, as sent by the client.
    pub content_type: Option<String>,

    /// Raw file bytes.
    pub bytes: Bytes,
}

impl MergeInput {
    /// Create an input from its parts.
    pub fn new(
        name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// Create an input declared as `application/pdf`.
    pub fn pdf(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(name, Some(PDF_MEDIA_TYPE), bytes)
    }

    /// Whether the declared content type is exactly `application/pdf`.
    pub fn is_declared_pdf(&self) -> bool {
        self.content_type.as_deref() == Some(PDF_MEDIA_TYPE)
    }
}

/// Ordered batch of uploaded files.
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    inputs: Vec<MergeInput>,
}

impl MergeRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input, keeping upload order.
    pub fn push(&mut self, input: MergeInput) {
        self.inputs.push(input);
    }

    pub fn inputs(&self) -> &[MergeInput] {
        &self.inputs
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl From<Vec<MergeInput>> for MergeRequest {
    fn from(inputs: Vec<MergeInput>) -> Self {
        Self { inputs }
    }
}

/// Why an input contributed no pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Declared content type was not `application/pdf`.
    NotPdf { content_type: Option<String> },

    /// Bytes could not be parsed as a PDF document.
    Unparsable { reason: String },

    /// Document is encrypted.
    Encrypted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPdf {
                content_type: Some(ct),
            } => write!(f, "not a PDF (declared {ct})"),
            Self::NotPdf { content_type: None } => write!(f, "not a PDF (no declared type)"),
            Self::Unparsable { reason } => write!(f, "unparsable: {reason}"),
            Self::Encrypted => write!(f, "encrypted"),
        }
    }
}

/// Outcome of a single input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// All pages of the input were appended.
    Merged { pages: usize },

    /// The input was skipped.
    Skipped(SkipReason),
}

/// Outcome of one input, by name.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub name: String,
    pub outcome: ItemOutcome,
}

/// Per-input outcomes of a merge, in upload order.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub items: Vec<ItemReport>,
}

impl MergeReport {
    pub(crate) fn record(&mut self, name: &str, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            name: name.to_string(),
            outcome,
        });
    }

    /// Number of inputs whose pages were appended.
    pub fn merged_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, ItemOutcome::Merged { .. }))
            .count()
    }

    /// Number of skipped inputs.
    pub fn skipped_count(&self) -> usize {
        self.items.len() - self.merged_count()
    }

    /// Skipped inputs with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ItemOutcome::Skipped(reason) => Some((item.name.as_str(), reason)),
            ItemOutcome::Merged { .. } => None,
        })
    }
}

/// Statistics about a completed merge.
#[derive(Debug, Clone, Default)]
pub struct MergeStatistics {
    /// Total pages in the output.
    pub total_pages: usize,

    /// Total bytes received.
    pub input_size: u64,

    /// Size of the serialized output.
    pub output_size: u64,

    /// Time spent parsing inputs.
    pub load_time: Duration,

    /// Wall time of the whole merge, serialization included.
    pub merge_time: Duration,
}

/// Serialized output plus what happened to each input.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub bytes: Vec<u8>,
    pub report: MergeReport,
    pub statistics: MergeStatistics,
}
