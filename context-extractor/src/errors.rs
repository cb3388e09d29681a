//! Error type for document extraction.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The PDF could not be loaded at all (truncated, encrypted, not a PDF).
    #[error("document parse error: {0}")]
    DocumentParse(#[from] lopdf::Error),

    /// Plain-text upload was not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Neither content type nor file name identify a PDF or text file.
    #[error("unsupported document type: {0}")]
    UnsupportedType(String),
}
