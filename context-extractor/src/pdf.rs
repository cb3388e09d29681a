//! Page-by-page PDF text extraction.

use lopdf::Document;
use tracing::{debug, warn};

use crate::errors::Result;

/// Extracts the text of every page, in page order, and concatenates it.
///
/// A page that yields no text, or whose extraction fails, contributes an
/// empty string. Only a document that cannot be loaded is an error.
///
/// # Errors
/// [`ExtractError::DocumentParse`](crate::errors::ExtractError::DocumentParse)
/// when `bytes` is not a loadable PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();

    let mut out = String::new();
    let mut empty_pages = 0usize;
    // BTreeMap keys are 1-based page numbers, already in order.
    for &page in pages.keys() {
        match doc.extract_text(&[page]) {
            Ok(text) if !text.trim().is_empty() => out.push_str(&text),
            Ok(_) => empty_pages += 1,
            Err(e) => {
                empty_pages += 1;
                warn!(page, error = %e, "page text extraction failed; skipping page");
            }
        }
    }

    debug!(
        pages = pages.len(),
        empty_pages,
        chars = out.chars().count(),
        "pdf text extracted"
    );
    Ok(out)
}
