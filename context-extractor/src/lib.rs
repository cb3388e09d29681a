//! Context extraction for a single request.
//!
//! Public API: [`extract_context`]. An uploaded document takes precedence over
//! pasted text; the result is the plain text that will be attached to the
//! next completion request (empty when nothing usable was supplied).

mod document;
pub mod errors;
mod pdf;

pub use document::{DocumentKind, Upload};
pub use errors::{ExtractError, Result};
pub use pdf::extract_pdf_text;

use tracing::debug;

/// Produces the context blob from an optional upload and optional pasted text.
///
/// - PDF upload: text of every page, concatenated in order.
/// - Plain-text upload: the bytes decoded as UTF-8, unchanged.
/// - Pasted text: used trimmed, only when non-empty after trimming.
/// - Otherwise: empty string.
///
/// # Errors
/// [`ExtractError`] when the upload cannot be decoded. Pasted text never fails.
///
/// # Example
/// ```
/// use context_extractor::extract_context;
/// let ctx = extract_context(None, Some("  quoted abstract \n")).unwrap();
/// assert_eq!(ctx, "quoted abstract");
/// ```
pub fn extract_context(upload: Option<Upload>, pasted: Option<&str>) -> Result<String> {
    if let Some(upload) = upload {
        debug!(
            kind = ?upload.kind,
            file = upload.file_name.as_deref().unwrap_or("<unnamed>"),
            bytes = upload.bytes.len(),
            "extracting uploaded document"
        );
        return match upload.kind {
            DocumentKind::Pdf => extract_pdf_text(&upload.bytes),
            DocumentKind::PlainText => Ok(String::from_utf8(upload.bytes)?),
        };
    }

    Ok(pasted
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .unwrap_or_default())
}
