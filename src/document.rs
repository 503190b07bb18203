//! The uploaded artifact and its inferred kind.
//!
//! Kind inference looks at the declared filename first and the declared MIME
//! type second. The bytes are never sniffed: a `.txt` file that happens to
//! start with `%PDF` is still decoded as text.

use crate::error::TranslitError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What kind of artifact a [`Document`] is, which decides how text is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Plain text: decoded directly, no OCR.
    Text,
    /// Raster image: decoded and OCR'd once.
    Image,
    /// PDF: every page rasterised and OCR'd.
    Pdf,
}

impl DocumentKind {
    /// Infer the kind from a filename extension (case-insensitive).
    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" => Some(Self::Image),
            _ => None,
        }
    }

    /// Infer the kind from a declared MIME type such as `application/pdf`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/plain" => Some(Self::Text),
            "application/pdf" => Some(Self::Pdf),
            "image/png" | "image/jpeg" | "image/jpg" | "image/tiff" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

/// An uploaded artifact. Lives for exactly one run.
#[derive(Clone)]
pub struct Document {
    name: String,
    mime: Option<String>,
    kind: DocumentKind,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    /// Build a document, inferring its kind from `name` then `mime`.
    ///
    /// # Errors
    /// [`TranslitError::UnsupportedDocument`] when neither the extension nor
    /// the MIME type names a supported kind.
    pub fn new(
        name: impl Into<String>,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, TranslitError> {
        let name = name.into();
        let kind = DocumentKind::from_extension(&name)
            .or_else(|| mime.and_then(DocumentKind::from_mime))
            .ok_or_else(|| TranslitError::UnsupportedDocument { name: name.clone() })?;
        Ok(Self {
            name,
            mime: mime.map(str::to_string),
            kind,
            bytes,
        })
    }

    /// Build a document with an explicit kind, bypassing inference.
    pub fn with_kind(name: impl Into<String>, kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            kind,
            bytes,
        }
    }

    /// Declared filename (no directory component when read from disk).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
