//! Document sources: directory discovery and PDF page extraction.

mod pdf;

pub use pdf::{DocumentLoader, PdfTextLoader};

use std::path::{Path, PathBuf};

use crate::error::IngestError;

/// Collect PDF files under `dir`, honouring exclude globs. Returned paths are
/// sorted so chunk ordering, and therefore batch slicing, is deterministic.
pub fn collect_pdf_files(dir: &Path, exclude: &[String]) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| IngestError::WalkError(e.to_string()))?;
        let path = entry.path();

        if !path.is_file() || !is_pdf(path) {
            continue;
        }

        let path_str = path.to_string_lossy();
        let excluded = exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(&path_str))
                .unwrap_or(false)
        });
        if !excluded {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
