//! Error types for the edgequake-translit library.
//!
//! Failures fall into three groups with different propagation rules:
//!
//! * [`AcquisitionError`] and [`OcrError`] — **Fatal to the run**: without
//!   text there is nothing to classify. They surface through
//!   [`TranslitError`] with the underlying engine message kept verbatim.
//!
//! * [`TransliterationError`] — **Isolated per target**: one unsupported
//!   source/target pair must not cost the user the other targets. These are
//!   stored inside [`crate::output::TargetOutput`] instead of being returned.
//!
//! * "No text extracted" is not an error at all; it is the
//!   [`crate::output::RunOutcome::NoText`] outcome.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-translit library.
#[derive(Debug, Error)]
pub enum TranslitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a readable path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file kind could not be inferred from its extension or MIME type.
    #[error(
        "Unsupported document '{name}'\n\
Accepted extensions: .txt, .pdf, .png, .jpg, .jpeg, .tiff"
    )]
    UnsupportedDocument { name: String },

    // ── Stage errors ──────────────────────────────────────────────────────
    /// The document could not be decoded or rasterised.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// The OCR engine failed on a page or image.
    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// The configured transliteration backend failed its startup probe.
    #[error(transparent)]
    Transliteration(#[from] TransliterationError),

    // ── User errors ───────────────────────────────────────────────────────
    /// Transliteration was requested with an empty target selection.
    #[error("No target scripts selected.\nPick at least one target script.")]
    NoTargetsSelected,

    /// The requested source scheme is not offered by the active profile.
    #[error("Unknown source scheme '{scheme}' for profile '{profile}'")]
    UnknownSourceScheme { scheme: String, profile: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or script-table validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The document was read but its text could not be obtained.
#[derive(Debug, Clone, Error)]
pub enum AcquisitionError {
    /// pdfium refused to open or rasterise the PDF.
    #[error("PDF to image conversion failed: {detail}")]
    PdfRenderFailed { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib) to use a\n\
specific copy, or install pdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    /// The uploaded bytes are not a decodable image.
    #[error("Couldn't open image: {detail}")]
    ImageDecodeFailed { detail: String },

    /// Page selection matched no page of the document.
    #[error("No selected page is in range (document has {total} pages)")]
    PageOutOfRange { total: usize },
}

/// Failure reported by an OCR engine.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum OcrError {
    /// The engine is not installed or not configured.
    #[error("OCR engine '{engine}' is not available.\n{hint}")]
    EngineUnavailable { engine: String, hint: String },

    /// The engine ran and reported an error (bad language data, corrupt image, API error).
    #[error("OCR engine '{engine}' failed: {message}")]
    EngineFailed { engine: String, message: String },

    /// The page image could not be re-encoded for the engine.
    #[error("Could not encode page image for OCR: {0}")]
    ImageEncodeFailed(String),
}

/// Failure of a single transliteration request.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum TransliterationError {
    /// The backend does not know one of the schemes.
    #[error("unsupported scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },

    /// The backend rejected the request or could not be reached.
    #[error("{engine}: {message}")]
    EngineFailed { engine: String, message: String },

    /// The backend failed its capability probe.
    #[error("Transliteration backend '{backend}' is not available: {detail}")]
    BackendUnavailable { backend: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_targets_display() {
        let msg = TranslitError::NoTargetsSelected.to_string();
        assert!(msg.contains("at least one"), "got: {msg}");
    }

    #[test]
    fn acquisition_error_is_transparent() {
        let e: TranslitError = AcquisitionError::PdfRenderFailed {
            detail: "bad xref".into(),
        }
        .into();
        assert!(e.to_string().contains("bad xref"));
        assert!(e.to_string().starts_with("PDF to image conversion failed"));
    }

    #[test]
    fn ocr_error_keeps_engine_message_verbatim() {
        let e: TranslitError = OcrError::EngineFailed {
            engine: "tesseract".into(),
            message: "Failed loading language 'xyz'".into(),
        }
        .into();
        assert!(e.to_string().contains("Failed loading language 'xyz'"));
    }

    #[test]
    fn unsupported_scheme_display() {
        let e = TransliterationError::UnsupportedScheme {
            scheme: "Klingon".into(),
        };
        assert_eq!(e.to_string(), "unsupported scheme 'Klingon'");
    }

    #[test]
    fn unsupported_document_lists_extensions() {
        let e = TranslitError::UnsupportedDocument {
            name: "notes.docx".into(),
        };
        assert!(e.to_string().contains("notes.docx"));
        assert!(e.to_string().contains(".tiff"));
    }
}
