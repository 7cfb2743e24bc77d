use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{PdfBindError, Result};
use crate::io::{PdfReader, PdfWriter};

use super::pages::OutputDocument;
use super::{
    ItemOutcome, MergeInput, MergeOutcome, MergeReport, MergeRequest, MergeStatistics, SkipReason,
};

/// Combines the pages of an ordered batch of uploads into one document.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    reader: PdfReader,
    writer: PdfWriter,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom writer for the final serialization.
    pub fn with_writer(writer: PdfWriter) -> Self {
        Self {
            reader: PdfReader::new(),
            writer,
        }
    }

    /// Merge every parsable PDF of `request`, in order, into one document.
    ///
    /// Inputs not declared as `application/pdf` and inputs that fail to parse
    /// are skipped. When nothing is usable the output is a valid document with
    /// zero pages.
    ///
    /// # Errors
    ///
    /// - [`PdfBindError::NoFilesToMerge`] if the request is empty
    /// - [`PdfBindError::MergeFailed`] if the output page tree cannot be updated
    /// - [`PdfBindError::SerializationFailed`] if the output cannot be written
    pub fn merge(&self, request: &MergeRequest) -> Result<MergeOutcome> {
        if request.is_empty() {
            return Err(PdfBindError::NoFilesToMerge);
        }

        let start = Instant::now();
        let total = request.len();
        let mut output = OutputDocument::create();
        let mut report = MergeReport::default();
        let mut load_time = Duration::ZERO;
        let mut input_size = 0u64;

        for (idx, input) in request.inputs().iter().enumerate() {
            input_size += input.bytes.len() as u64;

            let outcome = self.append_input(&mut output, input, &mut load_time)?;
            match &outcome {
                ItemOutcome::Merged { pages } => {
                    debug!(
                        "[{}/{}] {}: {} pages added",
                        idx + 1,
                        total,
                        input.name,
                        pages
                    );
                }
                ItemOutcome::Skipped(reason) => {
                    warn!("[{}/{}] skipping {}: {}", idx + 1, total, input.name, reason);
                }
            }
            report.record(&input.name, outcome);
        }

        let total_pages = output.page_count();
        let mut document = output.finish();
        let (bytes, write_stats) = self.writer.to_bytes(&mut document)?;

        let statistics = MergeStatistics {
            total_pages,
            input_size,
            output_size: write_stats.byte_size,
            load_time,
            merge_time: start.elapsed(),
        };

        info!(
            merged = report.merged_count(),
            skipped = report.skipped_count(),
            pages = total_pages,
            bytes = statistics.output_size,
            "merge complete"
        );

        Ok(MergeOutcome {
            bytes,
            report,
            statistics,
        })
    }

    /// Parse one input and append its pages.
    ///
    /// Per-input failures come back as [`ItemOutcome::Skipped`]; only failures
    /// that leave the output inconsistent are returned as errors.
    fn append_input(
        &self,
        output: &mut OutputDocument,
        input: &MergeInput,
        load_time: &mut Duration,
    ) -> Result<ItemOutcome> {
        if !input.is_declared_pdf() {
            return Ok(ItemOutcome::Skipped(SkipReason::NotPdf {
                content_type: input.content_type.clone(),
            }));
        }

        let loaded = match self.reader.load_bytes(&input.name, &input.bytes) {
            Ok(loaded) => loaded,
            Err(err) => return Ok(ItemOutcome::Skipped(skip_reason(err)?)),
        };
        *load_time += loaded.load_time;

        let page_ids = match output.import_pages(loaded.document) {
            Ok(ids) => ids,
            Err(err) => {
                return Ok(ItemOutcome::Skipped(SkipReason::Unparsable {
                    reason: err.to_string(),
                }));
            }
        };

        let pages = page_ids.len();
        for page_id in page_ids {
            output.add_page(page_id)?;
        }

        Ok(ItemOutcome::Merged { pages })
    }
}

/// Map a per-input load error to a skip reason; anything else propagates.
fn skip_reason(err: PdfBindError) -> Result<SkipReason> {
    match err {
        PdfBindError::EncryptedPdf { .. } => Ok(SkipReason::Encrypted),
        PdfBindError::FailedToLoadPdf { reason, .. } => Ok(SkipReason::Unparsable { reason }),
        other => Err(other),
    }
}
