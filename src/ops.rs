//! The `combine` workflow: scan inputs, build the selection, submit, save.

use std::path::PathBuf;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::io::PdfWriter;
use crate::output::OutputFormatter;
use crate::scan::fs::FsEntrySource;
use crate::scan::{FileHandle, ScanReport, Scanner};
use crate::selection::Selection;
use crate::transport::{MergeClient, SubmitControl, Uploader};
use crate::utils::collect_paths_for_patterns;

/// What a `combine` run did.
#[derive(Debug)]
pub struct CombineSummary {
    /// Scan totals and skipped entries.
    pub scan: ScanReport,
    /// Files submitted (or that would have been, in a dry run).
    pub selected: usize,
    /// Where the merged document was saved, if it was.
    pub saved: Option<PathBuf>,
}

/// Run the whole client flow described by `config`.
pub async fn combine(config: &ClientConfig, out: &OutputFormatter) -> Result<CombineSummary> {
    let (mut selection, scan) = build_selection(config).await?;

    out.scan_report(&scan);
    out.rejections(&selection);

    let removed = apply_removals(&mut selection, &config.remove)?;
    for handle in &removed {
        out.debug(&format!("Removed {}", handle.name()));
    }

    out.selection(&selection);

    let mut summary = CombineSummary {
        scan,
        selected: selection.len(),
        saved: None,
    };

    if config.dry_run {
        out.info("Dry run: nothing uploaded");
        return Ok(summary);
    }

    let client = MergeClient::new(&config.server_url)?;
    let control = SubmitControl::new(selection.subscribe(), config.success_reset);
    let uploader = Uploader::new(client, control);

    out.submit_state(&uploader.control().state());
    out.info(&format!("Uploading to {}...", config.server_url));

    let Some(download) = uploader.submit(&selection, &config.output_name).await? else {
        out.warning("No PDF files to combine");
        return Ok(summary);
    };
    out.submit_state(&uploader.control().state());

    if let Some(skipped) = download.files_skipped.filter(|&n| n > 0) {
        out.warning(&format!("The service skipped {skipped} file(s) it could not read"));
    }

    let path = PdfWriter::new()
        .save_bytes(&config.output_dir, &download.filename, &download.bytes)
        .await?;
    info!(path = %path.display(), bytes = download.bytes.len(), "download saved");
    out.success(&format!("Saved {}", path.display()));

    summary.saved = Some(path);
    Ok(summary)
}

/// Scan every input, in order, into a fresh selection.
pub async fn build_selection(config: &ClientConfig) -> Result<(Selection, ScanReport)> {
    let paths = collect_paths_for_patterns(&config.inputs)?;
    let source = FsEntrySource::new(config.batch_cap);
    let roots = source.entries_for(&paths).await;

    let mut selection = Selection::new();
    let scan = Scanner::new()
        .scan(&source, roots, |handle| {
            selection.add(handle);
        })
        .await;

    Ok((selection, scan))
}

/// Remove the items at `indices`, all of which refer to the current order.
///
/// Indices are applied highest first so earlier removals do not shift later
/// ones. Repeated indices are removed once.
pub fn apply_removals(selection: &mut Selection, indices: &[usize]) -> Result<Vec<FileHandle>> {
    let mut ordered = indices.to_vec();
    ordered.sort_unstable_by(|a, b| b.cmp(a));
    ordered.dedup();

    let mut removed = Vec::with_capacity(ordered.len());
    for index in ordered {
        removed.push(selection.remove_at(index)?);
    }
    removed.reverse();
    Ok(removed)
}
