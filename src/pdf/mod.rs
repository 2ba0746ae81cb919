//! PDF processing module - per-page text extraction

use lopdf::Document;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Extracted plain text keyed by 1-based page number
pub type PageText = BTreeMap<u32, String>;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract text from specific PDF pages.
///
/// `pages` takes 0-based page indices; `None` falls back to the caller's
/// configured key-page list. Indices past the end of the document are
/// skipped, and a page whose text cannot be decoded is logged and omitted
/// rather than failing the whole document.
pub fn extract_page_text(
    pdf_path: impl AsRef<Path>,
    pages: Option<&[usize]>,
    default_pages: &[usize],
) -> Result<PageText, PdfError> {
    let pdf_path = pdf_path.as_ref();
    let doc = Document::load(pdf_path).map_err(|e| PdfError::Load(e.to_string()))?;

    let total_pages = doc.get_pages().len();
    let indices = pages.unwrap_or(default_pages);

    let mut extracted = PageText::new();
    for &index in indices {
        if index >= total_pages {
            continue;
        }
        let page_number = (index + 1) as u32;
        match doc.extract_text(&[page_number]) {
            Ok(text) => {
                extracted.insert(page_number, text);
            }
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "failed to extract page text");
            }
        }
    }

    Ok(extracted)
}
