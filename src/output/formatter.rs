//! Message formatting and display for the `combine` command.
//!
//! # Examples
//!
//! ```
//! use pdfbind::output::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Scanning inputs...");
//! formatter.success("Saved merged-document.pdf");
//! ```

use std::io;

use crate::config::ClientConfig;
use crate::io::writer::format_file_size;
use crate::scan::ScanReport;
use crate::selection::Selection;
use crate::transport::SubmitState;

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
    Debug,
}

/// Console output with quiet and verbose modes.
#[derive(Debug)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: Self::should_use_color(),
        }
    }

    /// Create a formatter from the client configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Colors only when stdout is a terminal and TERM is set.
    fn should_use_color() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal() && std::env::var("TERM").is_ok()
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning. Always displayed.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error. Always displayed.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a verbose-only message.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let (prefix, color_code) = match level {
            MessageLevel::Info => ("", ""),
            MessageLevel::Success => ("✓ ", "\x1b[32m"),
            MessageLevel::Warning => ("⚠ ", "\x1b[33m"),
            MessageLevel::Error => ("✗ ", "\x1b[31m"),
            MessageLevel::Debug => ("→ ", "\x1b[36m"),
        };

        let line = if self.colored && !color_code.is_empty() {
            format!("{color_code}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        };

        match level {
            MessageLevel::Warning | MessageLevel::Error => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print the selection as a numbered list, plus the submit label.
    pub fn selection(&self, selection: &Selection) {
        if self.quiet {
            return;
        }
        for line in selection_lines(selection) {
            println!("{line}");
        }
    }

    /// Print scan failures as warnings and, in verbose mode, the totals.
    pub fn scan_report(&self, report: &ScanReport) {
        for failure in &report.failures {
            self.warning(&format!("Skipped {}: {}", failure.entry, failure.reason));
        }
        self.debug(&format!(
            "Scanned {} file(s) in {} folder(s), {} listing batch(es)",
            report.files_found, report.directories_visited, report.batches_read
        ));
    }

    /// Print the rejected candidates of the selection (verbose only).
    pub fn rejections(&self, selection: &Selection) {
        for (name, reason) in selection.report().rejected() {
            self.debug(&format!("Ignored {name}: {reason}"));
        }
    }

    /// Print a submit control transition (verbose only).
    pub fn submit_state(&self, state: &SubmitState) {
        self.debug(&format!("[{}]", state.label()));
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

/// Lines describing a selection: the count, each item, the submit label.
pub fn selection_lines(selection: &Selection) -> Vec<String> {
    let view = selection.view();
    if view.is_empty {
        return vec!["No PDF files selected".to_string()];
    }

    let mut lines = Vec::with_capacity(selection.len() + 2);
    lines.push(format!("Selected {}:", view.count_label));
    for (index, item) in selection.items().iter().enumerate() {
        lines.push(format!(
            "  [{index}] {} ({})",
            item.name(),
            format_file_size(item.size())
        ));
    }
    lines.push(format!("Ready: {}", view.submit_label));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::FileHandle;

    #[test]
    fn test_modes() {
        let formatter = OutputFormatter::new(true, false);
        assert!(formatter.is_quiet());
        assert!(!formatter.is_verbose());

        let formatter = OutputFormatter::new(false, true);
        assert!(!formatter.is_quiet());
        assert!(formatter.is_verbose());
    }

    #[test]
    fn test_selection_lines_empty() {
        assert_eq!(selection_lines(&Selection::new()), ["No PDF files selected"]);
    }

    #[test]
    fn test_selection_lines_lists_items_by_index() {
        let mut selection = Selection::new();
        selection.add(FileHandle::from_bytes("a.pdf", None, vec![0u8; 10]));
        selection.add(FileHandle::from_bytes("b.pdf", None, vec![0u8; 2048]));

        assert_eq!(
            selection_lines(&selection),
            [
                "Selected 2 files:",
                "  [0] a.pdf (10 bytes)",
                "  [1] b.pdf (2.00 KB)",
                "Ready: Combine 2 PDFs",
            ]
        );
    }

    #[test]
    fn test_messages_do_not_panic_in_any_mode() {
        for (quiet, verbose) in [(false, false), (true, false), (false, true)] {
            let formatter = OutputFormatter::new(quiet, verbose);
            formatter.info("info");
            formatter.success("success");
            formatter.warning("warning");
            formatter.error("error");
            formatter.debug("debug");
            formatter.section("section");
            formatter.scan_report(&ScanReport::default());
            formatter.submit_state(&SubmitState::Submitting);
        }
    }
}
