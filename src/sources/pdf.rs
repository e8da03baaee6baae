//! PDF page extraction via the poppler `pdftotext` binary.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::LoadError;
use crate::models::{LoadedDocument, PageText};

/// Decodes a document file into an ordered page sequence. Injected into the
/// pipeline so tests and alternative formats can swap the implementation.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<LoadedDocument, LoadError>;
}

/// Extracts page text by shelling out to `pdftotext`, which separates pages
/// with form-feed characters in its stdout stream.
#[derive(Debug, Clone, Default)]
pub struct PdfTextLoader;

impl PdfTextLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for PdfTextLoader {
    async fn load(&self, path: &Path) -> Result<LoadedDocument, LoadError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|e| LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(LoadError::Extraction {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        if text.trim().is_empty() {
            return Err(LoadError::NoText {
                path: path.to_path_buf(),
            });
        }

        Ok(LoadedDocument::new(filename, split_pages(&text)))
    }
}

/// Split extracted text into pages on form-feed boundaries, assigning 0-based
/// indices. Page numbers become 1-based later, at chunk creation, and only
/// there.
fn split_pages(text: &str) -> Vec<PageText> {
    text.split('\u{c}')
        .enumerate()
        .map(|(index, page_text)| PageText {
            index: index as u32,
            text: page_text.to_string(),
        })
        .filter(|page| !page.text.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("first page\u{c}second page\u{c}third page");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].index, 0);
        assert_eq!(pages[2].index, 2);
        assert_eq!(pages[1].text, "second page");
    }

    #[test]
    fn test_blank_trailing_page_dropped_but_indices_kept() {
        // pdftotext emits a trailing form feed after the last page.
        let pages = split_pages("only page\u{c}");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].index, 0);

        let pages = split_pages("one\u{c}   \n\u{c}three");
        assert_eq!(pages.len(), 2);
        // The blank middle page keeps its slot; "three" is still page index 2.
        assert_eq!(pages[1].index, 2);
    }
}
