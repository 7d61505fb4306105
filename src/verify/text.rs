//! Visible-text extraction from the document's text layer.

use super::types::TextSource;
use super::VerifyError;

/// Text-layer extractor for digital PDFs, via the pdf-extract crate.
pub struct PdfTextSource;

impl TextSource for PdfTextSource {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, VerifyError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| VerifyError::TextExtraction(e.to_string()))
    }
}

/// Join page texts and normalize for containment checks: pages joined with a
/// single space, whitespace runs collapsed to single spaces, lowercased.
/// Makes later substring checks insensitive to line breaks and the extra
/// spacing page layout introduces.
pub fn normalize_visible_text(pages: &[String]) -> String {
    pages
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
