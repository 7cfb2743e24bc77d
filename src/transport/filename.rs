//! Output filename derivation, shared by client and server.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

const PDF_SUFFIX: &str = ".pdf";

/// Characters left as-is in an RFC 5987 `ext-value`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Derive the download filename from what the user typed.
///
/// The input is trimmed; a blank result is replaced by `default_base`. One
/// trailing `.pdf` (any case) is stripped and exactly one `.pdf` appended.
///
/// ```
/// use pdfbind::transport::derive_output_filename;
///
/// assert_eq!(derive_output_filename("  Q3 report.PDF ", "merged"), "Q3 report.pdf");
/// assert_eq!(derive_output_filename("", "merged"), "merged.pdf");
/// ```
pub fn derive_output_filename(input: &str, default_base: &str) -> String {
    let trimmed = input.trim();
    let base = if trimmed.is_empty() {
        default_base
    } else {
        trimmed
    };

    format!("{}{PDF_SUFFIX}", strip_pdf_suffix(base))
}

fn strip_pdf_suffix(name: &str) -> &str {
    let split = name.len().saturating_sub(PDF_SUFFIX.len());
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(suffix)) if suffix.eq_ignore_ascii_case(PDF_SUFFIX) => stem,
        _ => name,
    }
}

/// The name a download is stored under: a single path component.
///
/// Path separators become `_`; an empty name or a bare `.`/`..` becomes `_`.
pub fn local_filename(name: &str) -> String {
    let flat = name.replace(['/', '\\'], "_");
    match flat.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => flat,
    }
}

/// ASCII-only fallback for the quoted `filename` parameter.
///
/// Path separators, quotes, control and non-ASCII characters become `_`.
pub fn header_safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '"' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect()
}

/// `Content-Disposition` value advertising `name` as an attachment.
///
/// Carries the ASCII fallback in `filename` and the exact stored name,
/// percent-encoded, in `filename*` (RFC 6266).
pub fn content_disposition(name: &str) -> String {
    let local = local_filename(name);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        header_safe_filename(&local),
        utf8_percent_encode(&local, ATTR_CHAR)
    )
}
