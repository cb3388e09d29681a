//! Upload descriptor and type detection.

use crate::errors::{ExtractError, Result};

/// How the bytes of an upload are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Detects the kind from a declared content type, falling back to the
    /// file extension when the content type is absent or generic.
    ///
    /// # Errors
    /// [`ExtractError::UnsupportedType`] when neither hint names a PDF or text file.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Result<Self> {
        let mime = content_type
            .map(|c| c.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .unwrap_or_default();

        match mime.as_str() {
            "application/pdf" => return Ok(Self::Pdf),
            m if m.starts_with("text/") => return Ok(Self::PlainText),
            _ => {}
        }

        let ext = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, e)| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("txt") | Some("md") => Ok(Self::PlainText),
            _ => {
                let what = if mime.is_empty() {
                    file_name.unwrap_or("unknown").to_string()
                } else {
                    mime
                };
                Err(ExtractError::UnsupportedType(what))
            }
        }
    }
}

/// A document uploaded for one request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            file_name: None,
            kind,
            bytes,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}
