//! Plain-text extraction from PDF files.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::{ExtractError, Result};

/// Extract the text of every page of the PDF at `path`, in page order.
///
/// Malformed and encrypted documents fail as a whole; there is no partial
/// result.
pub fn extract_pdf_pages(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|e| {
        ExtractError::Pdf(format!("Failed to load PDF '{}': {e}", path.display()))
    })?;
    if doc.is_encrypted() {
        return Err(ExtractError::EncryptedPdf(path.to_path_buf()));
    }

    // `get_pages` is keyed by page number, so iteration is in page order.
    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for &page_number in pages.keys() {
        let text = doc.extract_text(&[page_number]).map_err(|e| {
            ExtractError::Pdf(format!(
                "Failed to extract text from page {page_number} of '{}': {e}",
                path.display()
            ))
        })?;
        texts.push(text);
    }

    debug!(path = %path.display(), pages = texts.len(), "Extracted PDF text");
    Ok(texts)
}

/// Extract the text of the PDF at `path` as one string.
///
/// Each page's text is followed by a newline, the last page included. This
/// is the single routine used for PDF attachments of either container format.
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    Ok(join_pages(&extract_pdf_pages(path)?))
}

fn join_pages(pages: &[String]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_separator_after_each_page() {
        let pages = vec!["one".to_string(), "two".to_string()];
        assert_eq!(join_pages(&pages), "one\ntwo\n");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn test_missing_pdf() {
        let err = extract_pdf_text(Path::new("/nonexistent/report.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }

    #[test]
    fn test_not_a_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"this is plain text, not a PDF").unwrap();
        let err = extract_pdf_text(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
        assert!(err.to_string().starts_with("Failed to load PDF"));
    }
}
