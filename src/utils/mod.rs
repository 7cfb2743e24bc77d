use crate::error::{PdfBindError, Result};
use std::path::PathBuf;

/// Expand glob patterns into paths, keeping argument order.
///
/// Matches of a single pattern come back in glob's (sorted) order. A pattern
/// that matches nothing is kept as a literal path, so a mistyped name later
/// surfaces as an unreadable entry instead of vanishing.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        resolved_paths.extend(collect_paths_for_pattern(pattern.as_ref())?);
    }

    Ok(resolved_paths)
}

fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| {
        PdfBindError::invalid_config(format!("Invalid pattern '{pattern}': {err}"))
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => resolved_paths.push(path),
            // Unreadable matches are kept so the scanner reports them.
            Err(err) => resolved_paths.push(err.path().to_path_buf()),
        }
    }

    if resolved_paths.is_empty() {
        resolved_paths.push(PathBuf::from(pattern));
    }

    Ok(resolved_paths)
}
